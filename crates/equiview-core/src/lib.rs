//! Equiview Core - data types for the equipment annotation viewer
//!
//! This crate holds everything that does not depend on a renderer:
//! - Telemetry records and lenient decoding of host-page messages
//! - The service state those messages replace
//! - Panel and title content as typed presentational nodes
//! - Scene configuration (TOML)

pub mod color;
pub mod config;
pub mod message;
pub mod panel;
pub mod record;
pub mod state;

pub use color::{ColorError, Rgba};
pub use config::{AnchorSide, ConfigError, PanelConfig, PlacementPolicy, RouteStyle, SceneConfig};
pub use message::{HostCommand, InitParams, MessageError};
pub use panel::{render_panel, render_title, PanelNode, PanelText, TitleNode};
pub use record::{PanelRecord, RecordValue};
pub use state::{PanelId, ServiceState};
