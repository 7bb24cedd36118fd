//! Scene configuration
//!
//! Every field has a default reproducing the stock motor scene, so an empty
//! TOML document is a valid configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::{ColorError, Rgba};
use crate::panel::PanelText;
use crate::state::PanelId;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse scene config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize scene config: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Invalid color in {field}: {source}")]
    Color {
        field: &'static str,
        #[source]
        source: ColorError,
    },
    #[error("Invalid scene config: {0}")]
    Invalid(String),
}

/// Top-level scene configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub assets: AssetsConfig,
    pub camera: CameraConfig,
    pub title: TitleConfig,
    pub connector: ConnectorConfig,
    pub marker: MarkerConfig,
    pub axes: AxesConfig,
    pub protector: PanelConfig,
    pub warm: PanelConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            assets: AssetsConfig::default(),
            camera: CameraConfig::default(),
            title: TitleConfig::default(),
            connector: ConnectorConfig::default(),
            marker: MarkerConfig::default(),
            axes: AxesConfig::default(),
            protector: PanelConfig {
                title: "Protector Terminal Data".to_string(),
                side: AnchorSide::Left,
                placement: PlacementPolicy::Fixed {
                    position: [-3.2, 2.8, 1.0],
                },
                model_point: Some([-1.25, 1.478, 0.313]),
                route: RouteStyle::Bent { rise: 0.4 },
                pivot: default_pivot(),
            },
            warm: PanelConfig {
                title: "Vibration & Temperature Terminal Data".to_string(),
                side: AnchorSide::Right,
                placement: PlacementPolicy::Fixed {
                    position: [1.68, 2.8, 0.0],
                },
                model_point: Some([1.649, 1.492, -0.142]),
                route: RouteStyle::Straight,
                pivot: default_pivot(),
            },
        }
    }
}

impl SceneConfig {
    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn panel(&self, id: PanelId) -> &PanelConfig {
        match id {
            PanelId::Protector => &self.protector,
            PanelId::Warm => &self.warm,
        }
    }

    pub fn panel_text(&self) -> PanelText {
        PanelText {
            empty_label: self.title.empty_label.clone(),
            empty_value: self.title.empty_value.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_color("connector.color", &self.connector.color)?;
        parse_color("marker.color", &self.marker.color)?;

        let cam = &self.camera;
        check_finite(
            "camera",
            &[cam.fov_degrees, cam.near, cam.far, cam.distance, cam.lift, cam.zoom_range, cam.damping],
        )?;
        let marker = &self.marker;
        check_finite("marker", &[marker.radius, marker.outline_scale, marker.outline_opacity])?;
        check_finite("axes.size", &[self.axes.size])?;
        if self.axes.size < 0.0 {
            return Err(ConfigError::Invalid("axes.size must not be negative".to_string()));
        }
        for id in PanelId::ALL {
            self.panel(id).check_finite(id.key())?;
        }

        if self.marker.radius <= 0.0 {
            return Err(ConfigError::Invalid("marker.radius must be positive".to_string()));
        }
        if self.marker.outline_scale < 1.0 {
            return Err(ConfigError::Invalid("marker.outline_scale must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.marker.outline_opacity) {
            return Err(ConfigError::Invalid("marker.outline_opacity must be in [0, 1]".to_string()));
        }

        if cam.distance <= 0.0 || cam.zoom_range < 0.0 {
            return Err(ConfigError::Invalid(
                "camera.distance must be positive and camera.zoom_range non-negative".to_string(),
            ));
        }
        if !(cam.near > 0.0 && cam.far > cam.near) {
            return Err(ConfigError::Invalid("camera clip planes must satisfy 0 < near < far".to_string()));
        }
        if !(1.0..179.0).contains(&cam.fov_degrees) {
            return Err(ConfigError::Invalid("camera.fov_degrees must be in [1, 179)".to_string()));
        }
        if !(0.0..=1.0).contains(&cam.damping) {
            return Err(ConfigError::Invalid("camera.damping must be in [0, 1]".to_string()));
        }

        for id in PanelId::ALL {
            let panel = self.panel(id);
            if panel.pivot.iter().any(|p| !(0.0..=1.0).contains(p)) {
                return Err(ConfigError::Invalid(format!("{}.pivot must be in [0, 1]", id.key())));
            }
        }

        Ok(())
    }

    pub fn connector_color(&self) -> Rgba {
        Rgba::parse_or(&self.connector.color, Rgba::rgb(0x1e, 0xcf, 0xff))
    }

    pub fn marker_color(&self) -> Rgba {
        Rgba::parse_or(&self.marker.color, Rgba::rgb(51, 153, 255))
    }
}

fn check_finite(field: &str, values: &[f32]) -> Result<(), ConfigError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{} values must be finite", field)))
    }
}

fn parse_color(field: &'static str, value: &str) -> Result<Rgba, ConfigError> {
    Rgba::parse(value).map_err(|source| ConfigError::Color { field, source })
}

/// Asset paths, relative to the asset root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Equipment model that carries the anchors
    pub equipment: String,
    /// Decorative model, loaded independently
    pub decoration: Option<String>,
    /// TTF/OTF font added as a fallback for glyphs the built-in UI fonts lack (CJK)
    pub font: Option<String>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            equipment: "models/service.glb".to_string(),
            decoration: Some("models/plane.glb".to_string()),
            font: Some("fonts/NotoSansSC-Regular.otf".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Distance of the suggested camera position from the model center
    pub distance: f32,
    /// Vertical lift applied to both the orbit target and the camera
    pub lift: f32,
    /// How far the camera may zoom out beyond its initial distance
    pub zoom_range: f32,
    /// Fraction of the remaining motion applied per 60 Hz frame
    pub damping: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            distance: 10.0,
            lift: 2.0,
            zoom_range: 1.2,
            damping: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleConfig {
    /// Shown when the host has not supplied a service name
    pub placeholder: String,
    pub empty_label: String,
    pub empty_value: String,
}

impl Default for TitleConfig {
    fn default() -> Self {
        let text = PanelText::default();
        Self {
            placeholder: "Motor P0410".to_string(),
            empty_label: text.empty_label,
            empty_value: text.empty_value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    pub color: String,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            color: "#1ecfff".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub radius: f32,
    pub color: String,
    pub outline: bool,
    /// Outline disc radius relative to the marker radius
    pub outline_scale: f32,
    pub outline_opacity: f32,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            radius: 0.04,
            color: "#3399ff".to_string(),
            outline: true,
            outline_scale: 1.4,
            outline_opacity: 0.85,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxesConfig {
    pub show: bool,
    pub size: f32,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self { show: true, size: 2.0 }
    }
}

/// Which bounds-derived anchor a panel connects to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorSide {
    Left,
    Right,
}

/// Where a panel sits in the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PlacementPolicy {
    /// Scene-relative constant, independent of the loaded model
    Fixed { position: [f32; 3] },
    /// Displacement from the model anchor, or `fallback` while no anchor is known
    Offset { offset: [f32; 3], fallback: [f32; 3] },
}

/// Shape of a connector between a model point and its panel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "style", rename_all = "snake_case")]
pub enum RouteStyle {
    Straight,
    /// One elbow above the start point, directly below the panel
    Bent { rise: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    pub title: String,
    pub side: AnchorSide,
    pub placement: PlacementPolicy,
    /// Surface point on the model; the bounds anchor on `side` when unset
    #[serde(default)]
    pub model_point: Option<[f32; 3]>,
    pub route: RouteStyle,
    /// Panel point pinned to the placement, as fractions of its size
    /// (x from the left edge, y from the top edge)
    #[serde(default = "default_pivot")]
    pub pivot: [f32; 2],
}

impl PanelConfig {
    fn check_finite(&self, key: &str) -> Result<(), ConfigError> {
        match &self.placement {
            PlacementPolicy::Fixed { position } => check_finite(&format!("{}.placement", key), position)?,
            PlacementPolicy::Offset { offset, fallback } => {
                check_finite(&format!("{}.placement", key), offset)?;
                check_finite(&format!("{}.placement", key), fallback)?;
            }
        }
        if let Some(point) = &self.model_point {
            check_finite(&format!("{}.model_point", key), point)?;
        }
        if let RouteStyle::Bent { rise } = self.route {
            check_finite(&format!("{}.route", key), &[rise])?;
        }
        check_finite(&format!("{}.pivot", key), &self.pivot)
    }
}

fn default_pivot() -> [f32; 2] {
    [0.5, 1.0]
}
