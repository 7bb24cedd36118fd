//! Annotation layout
//!
//! Pure geometry for placing the two data panels, routing connectors from the
//! model to each panel, and describing the endpoint markers. Nothing here
//! touches the ECS; `annotations` turns a plan into entities.

use bevy::math::{Quat, Vec2, Vec3};
use equiview_core::config::{AnchorSide, PlacementPolicy, RouteStyle};
use equiview_core::{PanelId, Rgba, SceneConfig};

/// Outline discs sit this far behind their marker along the disc normal
pub const OUTLINE_DEPTH_OFFSET: f32 = 0.001;

/// Axis-aligned bounding volume of a loaded model, in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelBounds {
    pub center: Vec3,
    pub size: Vec3,
    /// Half of the largest dimension
    pub radius: f32,
}

impl ModelBounds {
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        let size = max - min;
        Self {
            center: (min + max) * 0.5,
            size,
            radius: size.max_element() * 0.5,
        }
    }

    /// Left/right anchors at the bounding-box faces along X
    pub fn anchors(&self) -> ModelAnchors {
        let half_width = Vec3::new(self.size.x * 0.5, 0.0, 0.0);
        ModelAnchors {
            left: self.center - half_width,
            right: self.center + half_width,
        }
    }

    /// Camera position on the (1, 1, 1) diagonal, `distance` from the center
    pub fn suggested_camera_position(&self, distance: f32) -> Vec3 {
        self.center + Vec3::ONE.normalize() * distance
    }
}

/// Named anchor points derived from a model's bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelAnchors {
    pub left: Vec3,
    pub right: Vec3,
}

impl ModelAnchors {
    pub fn side(&self, side: AnchorSide) -> Vec3 {
        match side {
            AnchorSide::Left => self.left,
            AnchorSide::Right => self.right,
        }
    }
}

/// Where a panel is pinned in the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelPlacement {
    pub position: Vec3,
    /// Point of the panel pinned to `position`, as fractions of its size
    /// (x from the left edge, y from the top edge)
    pub pivot: Vec2,
}

/// Resolve a panel position from its policy. Deterministic for a given anchor.
pub fn compute_panel_placement(anchor: Option<Vec3>, policy: &PlacementPolicy) -> Vec3 {
    match policy {
        PlacementPolicy::Fixed { position } => Vec3::from_array(*position),
        PlacementPolicy::Offset { offset, fallback } => match anchor {
            Some(anchor) => anchor + Vec3::from_array(*offset),
            None => Vec3::from_array(*fallback),
        },
    }
}

/// Polyline from a model point to a panel
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorPath {
    pub points: Vec<Vec3>,
}

impl ConnectorPath {
    pub fn start(&self) -> Vec3 {
        self.points[0]
    }

    pub fn end(&self) -> Vec3 {
        self.points[self.points.len() - 1]
    }
}

/// Route a connector. Bent routes rise from `from` and then run level to
/// directly below `to` before going up to it.
pub fn build_connector(from: Vec3, to: Vec3, route: RouteStyle) -> ConnectorPath {
    let points = match route {
        RouteStyle::Straight => vec![from, to],
        RouteStyle::Bent { rise } => vec![from, Vec3::new(to.x, from.y + rise, to.z), to],
    };
    ConnectorPath { points }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlineStyle {
    pub scale: f32,
    pub opacity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    pub radius: f32,
    pub color: Rgba,
    pub outline: Option<OutlineStyle>,
}

impl MarkerStyle {
    pub fn from_config(config: &SceneConfig) -> Self {
        let marker = &config.marker;
        Self {
            radius: marker.radius,
            color: config.marker_color(),
            outline: marker.outline.then_some(OutlineStyle {
                scale: marker.outline_scale,
                opacity: marker.outline_opacity,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlineSpec {
    pub radius: f32,
    pub color: Rgba,
}

/// A camera-facing disc at a connector endpoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerSpec {
    pub position: Vec3,
    pub radius: f32,
    pub color: Rgba,
    pub outline: Option<OutlineSpec>,
}

pub fn build_marker(point: Vec3, style: &MarkerStyle) -> MarkerSpec {
    MarkerSpec {
        position: point,
        radius: style.radius,
        color: style.color,
        outline: style.outline.map(|o| OutlineSpec {
            radius: style.radius * o.scale,
            color: style.color.with_alpha((o.opacity * 255.0).round() as u8),
        }),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedConnector {
    pub panel: PanelId,
    pub path: ConnectorPath,
}

/// Everything needed to annotate one model
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationPlan {
    pub panels: Vec<(PanelId, PanelPlacement)>,
    pub connectors: Vec<PlannedConnector>,
    pub markers: Vec<MarkerSpec>,
}

/// Placement for one panel given whatever anchors are known
pub fn plan_panel(panel: PanelId, anchors: Option<&ModelAnchors>, config: &SceneConfig) -> PanelPlacement {
    let panel_config = config.panel(panel);
    let anchor = anchors.map(|a| a.side(panel_config.side));
    PanelPlacement {
        position: compute_panel_placement(anchor, &panel_config.placement),
        pivot: Vec2::from_array(panel_config.pivot),
    }
}

/// Lay out both panels, and when the model anchors are known, their
/// connectors plus one marker at each connector endpoint.
pub fn plan_annotations(anchors: Option<&ModelAnchors>, config: &SceneConfig) -> AnnotationPlan {
    let panels: Vec<_> = PanelId::ALL
        .iter()
        .map(|&id| (id, plan_panel(id, anchors, config)))
        .collect();

    let Some(anchors) = anchors else {
        return AnnotationPlan {
            panels,
            connectors: Vec::new(),
            markers: Vec::new(),
        };
    };

    let style = MarkerStyle::from_config(config);
    let mut connectors = Vec::with_capacity(panels.len());
    let mut markers = Vec::with_capacity(panels.len() * 2);

    for (id, placement) in &panels {
        let panel_config = config.panel(*id);
        let from = panel_config
            .model_point
            .map(Vec3::from_array)
            .unwrap_or_else(|| anchors.side(panel_config.side));
        let path = build_connector(from, placement.position, panel_config.route);

        markers.push(build_marker(path.start(), &style));
        markers.push(build_marker(path.end(), &style));
        connectors.push(PlannedConnector { panel: *id, path });
    }

    AnnotationPlan {
        panels,
        connectors,
        markers,
    }
}

/// Rotation that turns a disc's +Z normal toward the camera.
///
/// A pure function of the two positions; `None` when they coincide.
pub fn billboard_rotation(marker: Vec3, camera: Vec3) -> Option<Quat> {
    let to_camera = camera - marker;
    if to_camera.length_squared() < 1e-12 {
        return None;
    }
    Some(Quat::from_rotation_arc(Vec3::Z, to_camera.normalize()))
}
