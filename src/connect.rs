//! Magnetic connection points: anchor geometry, per-shape marker visibility,
//! and live connector bindings.
//!
//! Anchor indices are stable: 0..4 are the N/E/S/W side midpoints, 4..8 the
//! NW/NE/SE/SW corners. Display may be limited to the midpoints
//! (`ConnectConfig::include_corners`), but bindings always resolve against
//! the full set. Anchor positions are derived from the shape's current
//! bounding box on every query; nothing is cached.

use std::collections::HashMap;

use crate::config::ConnectConfig;
use crate::error::SceneError;
use crate::scene::{adapter, Binding, Scene, ShapeGeometry};

pub const ANCHORS_PER_SHAPE: usize = 8;

/// Fixed anchor positions on a bounding box perimeter.
pub fn anchor_points(
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    include_corners: bool,
) -> Vec<(f32, f32)> {
    let mut points = vec![
        (x + width / 2.0, y),
        (x + width, y + height / 2.0),
        (x + width / 2.0, y + height),
        (x, y + height / 2.0),
    ];
    if include_corners {
        points.extend([
            (x, y),
            (x + width, y),
            (x + width, y + height),
            (x, y + height),
        ]);
    }
    points
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorVisibility {
    Hidden,
    Visible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorEnd {
    Start,
    End,
}

/// Pointer/selection happenings the visibility machine consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectEvent {
    ModeChanged(bool),
    PointerEnter(String),
    PointerLeave(String),
    Selected(String),
    Deselected(String),
    Bind {
        connector: String,
        shape: String,
        anchor_index: usize,
        end: ConnectorEnd,
    },
}

/// Per-shape marker visibility, driven by explicit events instead of ad-hoc
/// hover callbacks. Markers show while connection mode is on and the shape
/// is hovered or selected; outside the mode nothing is ever shown.
#[derive(Debug, Default)]
pub struct ConnectionPoints {
    mode_enabled: bool,
    hovered: Option<String>,
    selected: Option<String>,
}

impl ConnectionPoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode_enabled(&self) -> bool {
        self.mode_enabled
    }

    pub fn on_event(&mut self, scene: &mut Scene, event: ConnectEvent) -> Result<(), SceneError> {
        match event {
            ConnectEvent::ModeChanged(enabled) => {
                self.mode_enabled = enabled;
                if !enabled {
                    self.hovered = None;
                }
            }
            ConnectEvent::PointerEnter(id) => {
                if self.mode_enabled
                    && scene.object(&id).is_some_and(|o| !o.is_connector())
                {
                    self.hovered = Some(id);
                }
            }
            ConnectEvent::PointerLeave(id) => {
                if self.hovered.as_deref() == Some(id.as_str()) {
                    self.hovered = None;
                }
            }
            ConnectEvent::Selected(id) => {
                self.selected = Some(id);
            }
            ConnectEvent::Deselected(id) => {
                if self.selected.as_deref() == Some(id.as_str()) {
                    self.selected = None;
                }
            }
            ConnectEvent::Bind {
                connector,
                shape,
                anchor_index,
                end,
            } => {
                if self.visibility(&shape) != AnchorVisibility::Visible {
                    log::debug!("ignoring bind to {shape}: markers not visible");
                    return Ok(());
                }
                bind(scene, &connector, end, &shape, anchor_index)?;
            }
        }
        Ok(())
    }

    pub fn visibility(&self, shape_id: &str) -> AnchorVisibility {
        if !self.mode_enabled {
            return AnchorVisibility::Hidden;
        }
        let hovered = self.hovered.as_deref() == Some(shape_id);
        let selected = self.selected.as_deref() == Some(shape_id);
        if hovered || selected {
            AnchorVisibility::Visible
        } else {
            AnchorVisibility::Hidden
        }
    }

    /// Marker positions for a shape, recomputed from its current bounding
    /// box. Empty unless the shape is in the `Visible` state.
    pub fn markers(
        &self,
        scene: &Scene,
        shape_id: &str,
        config: &ConnectConfig,
    ) -> Vec<(f32, f32)> {
        if self.visibility(shape_id) != AnchorVisibility::Visible {
            return Vec::new();
        }
        let Some(shape) = scene.object(shape_id) else {
            return Vec::new();
        };
        anchor_points(
            shape.x,
            shape.y,
            shape.width,
            shape.height,
            config.include_corners,
        )
    }
}

/// Records a binding on one connector endpoint and immediately recomputes
/// that endpoint from the shape's current geometry.
pub fn bind(
    scene: &mut Scene,
    connector_id: &str,
    end: ConnectorEnd,
    shape_id: &str,
    anchor_index: usize,
) -> Result<(), SceneError> {
    if scene.object(shape_id).is_none() {
        return Err(SceneError::UnknownObject(shape_id.to_string()));
    }
    {
        let object = scene
            .object_mut(connector_id)
            .ok_or_else(|| SceneError::UnknownObject(connector_id.to_string()))?;
        if !object.is_connector() {
            return Err(SceneError::NotAConnector(connector_id.to_string()));
        }
        let binding = Binding {
            shape_id: shape_id.to_string(),
            anchor_index: anchor_index % ANCHORS_PER_SHAPE,
        };
        match end {
            ConnectorEnd::Start => object.bindings.start = Some(binding),
            ConnectorEnd::End => object.bindings.end = Some(binding),
        }
    }
    refresh_connector(scene, connector_id);
    Ok(())
}

/// Recomputes the endpoints of every connector bound to `shape_id`. Called
/// by the scene after each move/resize so bound endpoints can never go
/// stale.
pub fn refresh_bindings(scene: &mut Scene, shape_id: &str) {
    let connector_ids: Vec<String> = scene
        .objects()
        .iter()
        .filter(|o| o.is_connector() && o.bindings.references(shape_id))
        .map(|o| o.id.clone())
        .collect();
    for id in connector_ids {
        refresh_connector(scene, &id);
    }
}

fn resolve_anchor(scene: &Scene, binding: &Binding) -> Option<(f32, f32)> {
    let shape = scene.object(&binding.shape_id)?;
    anchor_points(shape.x, shape.y, shape.width, shape.height, true)
        .get(binding.anchor_index)
        .copied()
}

fn refresh_connector(scene: &mut Scene, connector_id: &str) {
    let Some(connector) = scene.object(connector_id) else {
        return;
    };
    let bindings = connector.bindings.clone();
    let start = bindings.start.as_ref().and_then(|b| resolve_anchor(scene, b));
    let end = bindings.end.as_ref().and_then(|b| resolve_anchor(scene, b));

    let updated = {
        let Some(object) = scene.object_mut(connector_id) else {
            return;
        };
        let ShapeGeometry::Connector { points, arrowhead } = &mut object.shape else {
            return;
        };
        if let (Some(point), Some(first)) = (start, points.first_mut()) {
            *first = point;
        }
        if let (Some(point), Some(last)) = (end, points.last_mut()) {
            *last = point;
        }
        if points.len() >= 2
            && let Some(head) = arrowhead
        {
            // Preserve the arrow size the connector was created with.
            let (tip, left) = (head[0], head[1]);
            let size = ((tip.0 - left.0).powi(2) + (tip.1 - left.1).powi(2)).sqrt();
            let from = points[points.len() - 2];
            let to = points[points.len() - 1];
            *head = adapter::arrowhead_points(from, to, size);
        }
        let (x, y, width, height) = adapter::points_bbox(points);
        object.x = x;
        object.y = y;
        object.width = width;
        object.height = height;
        true
    };
    if updated {
        scene.notify_modified(connector_id);
    }
}

/// Debug helper: how many connectors currently observe each shape.
pub fn binding_counts(scene: &Scene) -> HashMap<String, usize> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for object in scene.objects() {
        if !object.is_connector() {
            continue;
        }
        for binding in [&object.bindings.start, &object.bindings.end]
            .into_iter()
            .flatten()
        {
            *counts.entry(binding.shape_id.clone()).or_insert(0) += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeStyle;
    use crate::scene::{ConnectorBindings, SceneObject};

    fn shape(id: &str, x: f32, y: f32) -> SceneObject {
        SceneObject {
            id: id.to_string(),
            shape: ShapeGeometry::Rect { rounded: true },
            x,
            y,
            width: 100.0,
            height: 50.0,
            label: None,
            style: NodeStyle::default(),
            bindings: ConnectorBindings::default(),
        }
    }

    fn connector(id: &str) -> SceneObject {
        SceneObject {
            id: id.to_string(),
            shape: ShapeGeometry::Connector {
                points: vec![(0.0, 0.0), (10.0, 10.0)],
                arrowhead: Some(adapter::arrowhead_points((0.0, 0.0), (10.0, 10.0), 10.0)),
            },
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            label: None,
            style: NodeStyle::default(),
            bindings: ConnectorBindings::default(),
        }
    }

    #[test]
    fn midpoint_anchors_sit_on_the_box_sides() {
        let anchors = anchor_points(10.0, 20.0, 100.0, 50.0, false);
        assert_eq!(anchors.len(), 4);
        assert_eq!(anchors[0], (60.0, 20.0)); // N
        assert_eq!(anchors[1], (110.0, 45.0)); // E
        assert_eq!(anchors[2], (60.0, 70.0)); // S
        assert_eq!(anchors[3], (10.0, 45.0)); // W
        assert_eq!(anchor_points(10.0, 20.0, 100.0, 50.0, true).len(), 8);
    }

    #[test]
    fn markers_follow_the_mode_and_hover_state() {
        let mut scene = Scene::new(800.0, 600.0);
        scene.add_object(shape("a", 0.0, 0.0));
        let mut points = ConnectionPoints::new();
        let config = ConnectConfig::default();

        // Hover without mode: nothing shows.
        points
            .on_event(&mut scene, ConnectEvent::PointerEnter("a".to_string()))
            .unwrap();
        assert_eq!(points.visibility("a"), AnchorVisibility::Hidden);

        points
            .on_event(&mut scene, ConnectEvent::ModeChanged(true))
            .unwrap();
        points
            .on_event(&mut scene, ConnectEvent::PointerEnter("a".to_string()))
            .unwrap();
        assert_eq!(points.visibility("a"), AnchorVisibility::Visible);
        assert_eq!(points.markers(&scene, "a", &config).len(), 4);

        // Leaving hides, unless the shape is the selection.
        points
            .on_event(&mut scene, ConnectEvent::Selected("a".to_string()))
            .unwrap();
        points
            .on_event(&mut scene, ConnectEvent::PointerLeave("a".to_string()))
            .unwrap();
        assert_eq!(points.visibility("a"), AnchorVisibility::Visible);

        points
            .on_event(&mut scene, ConnectEvent::Deselected("a".to_string()))
            .unwrap();
        assert_eq!(points.visibility("a"), AnchorVisibility::Hidden);

        // Mode off clears hover state entirely.
        points
            .on_event(&mut scene, ConnectEvent::PointerEnter("a".to_string()))
            .unwrap();
        points
            .on_event(&mut scene, ConnectEvent::ModeChanged(false))
            .unwrap();
        assert_eq!(points.visibility("a"), AnchorVisibility::Hidden);
    }

    #[test]
    fn bound_endpoint_tracks_shape_movement_exactly() {
        let mut scene = Scene::new(800.0, 600.0);
        scene.add_object(shape("a", 100.0, 100.0));
        scene.add_object(connector("c"));
        // Anchor 2 is the south midpoint.
        bind(&mut scene, "c", ConnectorEnd::End, "a", 2).unwrap();

        let endpoint_of = |scene: &Scene| -> (f32, f32) {
            let ShapeGeometry::Connector { points, .. } = &scene.object("c").unwrap().shape
            else {
                panic!("expected connector");
            };
            *points.last().unwrap()
        };
        let before = endpoint_of(&scene);
        assert_eq!(before, (150.0, 150.0));

        scene.move_object("a", 30.0, -12.5).unwrap();
        let after = endpoint_of(&scene);
        assert_eq!(after, (before.0 + 30.0, before.1 - 12.5));
    }

    #[test]
    fn anchors_track_resize_too() {
        let mut scene = Scene::new(800.0, 600.0);
        scene.add_object(shape("a", 100.0, 100.0));
        scene.add_object(connector("c"));
        bind(&mut scene, "c", ConnectorEnd::Start, "a", 1).unwrap();

        scene.resize_object("a", 200.0, 80.0).unwrap();
        let ShapeGeometry::Connector { points, .. } = &scene.object("c").unwrap().shape else {
            panic!("expected connector");
        };
        // East midpoint of the resized box.
        assert_eq!(points[0], (300.0, 140.0));
    }

    #[test]
    fn bind_rejects_non_connectors_and_unknown_shapes() {
        let mut scene = Scene::new(800.0, 600.0);
        scene.add_object(shape("a", 0.0, 0.0));
        scene.add_object(shape("b", 200.0, 0.0));
        assert_eq!(
            bind(&mut scene, "a", ConnectorEnd::End, "b", 0).unwrap_err(),
            SceneError::NotAConnector("a".to_string())
        );
        scene.add_object(connector("c"));
        assert_eq!(
            bind(&mut scene, "c", ConnectorEnd::End, "ghost", 0).unwrap_err(),
            SceneError::UnknownObject("ghost".to_string())
        );
    }
}
