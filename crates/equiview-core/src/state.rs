//! Service state shown by the viewer

use crate::message::InitParams;
use crate::record::PanelRecord;

/// The two data panels. Order here is the order panels are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelId {
    /// Protector terminal data (left)
    Protector,
    /// Vibration/temperature terminal data (right)
    Warm,
}

impl PanelId {
    pub const ALL: [PanelId; 2] = [PanelId::Protector, PanelId::Warm];

    pub fn key(&self) -> &'static str {
        match self {
            PanelId::Protector => "protector",
            PanelId::Warm => "warm",
        }
    }
}

/// Data last received from the host page
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ServiceState {
    pub service_name: String,
    pub protector: Vec<PanelRecord>,
    pub warm: Vec<PanelRecord>,
}

impl ServiceState {
    /// Replace everything with the contents of an `init` message. No merging.
    pub fn apply(&mut self, params: InitParams) {
        *self = Self {
            service_name: params.service_name,
            protector: params.protector,
            warm: params.warm,
        };
    }

    pub fn records(&self, panel: PanelId) -> &[PanelRecord] {
        match panel {
            PanelId::Protector => &self.protector,
            PanelId::Warm => &self.warm,
        }
    }
}
