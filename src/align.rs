//! Multi-select alignment and drag snapping against canvas/shape guidelines.
//!
//! Snapping is preview-soft during the drag (`update_drag` mutates nothing,
//! it only reports where the shape would land) and hard on release:
//! `end_drag` always commits the snapped position once the drag has engaged.

use crate::config::SnapConfig;
use crate::error::SceneError;
use crate::scene::Scene;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignMode {
    Left,
    Right,
    Top,
    Bottom,
    CenterHorizontal,
    CenterVertical,
}

/// Aligns the given shapes along one edge or center line. Center modes use
/// the average of the selection's centers. Fewer than two resolvable
/// non-connector targets is a no-op.
pub fn align(scene: &mut Scene, ids: &[&str], mode: AlignMode) -> Result<(), SceneError> {
    let mut targets: Vec<(String, f32, f32, f32, f32)> = Vec::new();
    for id in ids {
        let Some(object) = scene.object(id) else {
            continue;
        };
        if object.is_connector() {
            continue;
        }
        targets.push((
            object.id.clone(),
            object.x,
            object.y,
            object.width,
            object.height,
        ));
    }
    if targets.len() < 2 {
        return Ok(());
    }

    match mode {
        AlignMode::Left => {
            let edge = targets.iter().map(|t| t.1).fold(f32::INFINITY, f32::min);
            for (id, _, y, _, _) in &targets {
                scene.set_object_position(id, edge, *y)?;
            }
        }
        AlignMode::Right => {
            let edge = targets
                .iter()
                .map(|t| t.1 + t.3)
                .fold(f32::NEG_INFINITY, f32::max);
            for (id, _, y, w, _) in &targets {
                scene.set_object_position(id, edge - w, *y)?;
            }
        }
        AlignMode::Top => {
            let edge = targets.iter().map(|t| t.2).fold(f32::INFINITY, f32::min);
            for (id, x, _, _, _) in &targets {
                scene.set_object_position(id, *x, edge)?;
            }
        }
        AlignMode::Bottom => {
            let edge = targets
                .iter()
                .map(|t| t.2 + t.4)
                .fold(f32::NEG_INFINITY, f32::max);
            for (id, x, _, _, h) in &targets {
                scene.set_object_position(id, *x, edge - h)?;
            }
        }
        AlignMode::CenterHorizontal => {
            let center: f32 =
                targets.iter().map(|t| t.2 + t.4 / 2.0).sum::<f32>() / targets.len() as f32;
            for (id, x, _, _, h) in &targets {
                scene.set_object_position(id, *x, center - h / 2.0)?;
            }
        }
        AlignMode::CenterVertical => {
            let center: f32 =
                targets.iter().map(|t| t.1 + t.3 / 2.0).sum::<f32>() / targets.len() as f32;
            for (id, _, y, w, _) in &targets {
                scene.set_object_position(id, center - w / 2.0, *y)?;
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuidelineAxis {
    Vertical,
    Horizontal,
}

/// A matched snap line, in absolute scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Guideline {
    pub axis: GuidelineAxis,
    pub position: f32,
}

/// Where the dragged shape would land plus the guidelines it matched.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapFeedback {
    pub position: (f32, f32),
    pub guidelines: Vec<Guideline>,
}

#[derive(Debug, Clone)]
struct DragSession {
    id: String,
    origin_pointer: (f32, f32),
    origin_pos: (f32, f32),
    engaged: bool,
}

/// Drag-time snap engine. One drag session at a time; guideline candidates
/// are rebuilt from the live scene on every update so stale geometry can
/// never be matched.
#[derive(Debug)]
pub struct SnapEngine {
    config: SnapConfig,
    drag: Option<DragSession>,
}

impl SnapEngine {
    pub fn new(config: SnapConfig) -> Self {
        Self { config, drag: None }
    }

    pub fn dragging(&self) -> Option<&str> {
        self.drag.as_ref().map(|d| d.id.as_str())
    }

    pub fn begin_drag(
        &mut self,
        scene: &Scene,
        id: &str,
        pointer: (f32, f32),
    ) -> Result<(), SceneError> {
        let object = scene
            .object(id)
            .ok_or_else(|| SceneError::UnknownObject(id.to_string()))?;
        if object.is_connector() {
            return Err(SceneError::NotAShape(id.to_string()));
        }
        self.drag = Some(DragSession {
            id: id.to_string(),
            origin_pointer: pointer,
            origin_pos: (object.x, object.y),
            engaged: false,
        });
        Ok(())
    }

    /// Computes the snapped preview position for the current pointer. Does
    /// not move anything: the host renders the preview and guidelines, the
    /// commit happens in `end_drag`. Snapping stays disengaged until the
    /// pointer has travelled past the movement threshold, so a sloppy click
    /// cannot nudge a shape onto a nearby guideline.
    pub fn update_drag(&mut self, scene: &Scene, pointer: (f32, f32)) -> Option<SnapFeedback> {
        let session = self.drag.as_mut()?;
        let dx = pointer.0 - session.origin_pointer.0;
        let dy = pointer.1 - session.origin_pointer.1;
        if !session.engaged {
            if (dx * dx + dy * dy).sqrt() < self.config.movement_threshold {
                return Some(SnapFeedback {
                    position: session.origin_pos,
                    guidelines: Vec::new(),
                });
            }
            session.engaged = true;
        }
        let raw = (session.origin_pos.0 + dx, session.origin_pos.1 + dy);
        let session_id = session.id.clone();
        Some(snap_position(scene, &session_id, raw, &self.config))
    }

    /// Ends the drag and commits the final position. Once the drag engaged,
    /// the commit always goes through the snap pass, so a release near a
    /// guideline lands exactly on it.
    pub fn end_drag(&mut self, scene: &mut Scene, pointer: (f32, f32)) -> Result<(), SceneError> {
        let Some(session) = self.drag.take() else {
            return Ok(());
        };
        let dx = pointer.0 - session.origin_pointer.0;
        let dy = pointer.1 - session.origin_pointer.1;
        if !session.engaged
            && (dx * dx + dy * dy).sqrt() < self.config.movement_threshold
        {
            return Ok(());
        }
        let raw = (session.origin_pos.0 + dx, session.origin_pos.1 + dy);
        let feedback = snap_position(scene, &session.id, raw, &self.config);
        scene.set_object_position(&session.id, feedback.position.0, feedback.position.1)
    }
}

/// Snaps a candidate top-left position for `id` against guideline sources:
/// the canvas center lines plus the edges/centers of nearby shapes.
fn snap_position(
    scene: &Scene,
    id: &str,
    raw: (f32, f32),
    config: &SnapConfig,
) -> SnapFeedback {
    let Some(dragged) = scene.object(id) else {
        return SnapFeedback {
            position: raw,
            guidelines: Vec::new(),
        };
    };
    let (w, h) = (dragged.width, dragged.height);
    let center = (raw.0 + w / 2.0, raw.1 + h / 2.0);

    let mut verticals = vec![scene.width() / 2.0];
    let mut horizontals = vec![scene.height() / 2.0];
    for other in scene.objects() {
        if other.id == id || other.is_connector() {
            continue;
        }
        let oc = other.center();
        let dist = ((oc.0 - center.0).powi(2) + (oc.1 - center.1).powi(2)).sqrt();
        if dist > config.search_radius {
            continue;
        }
        verticals.extend([other.x, oc.0, other.x + other.width]);
        horizontals.extend([other.y, oc.1, other.y + other.height]);
    }

    let mut position = raw;
    let mut guidelines = Vec::new();

    // Dragged edges/center vs vertical lines; closest match wins.
    let x_probes = [
        (raw.0, 0.0),
        (center.0, w / 2.0),
        (raw.0 + w, w),
    ];
    if let Some((line, offset)) = best_match(&x_probes, &verticals, config.snap_distance) {
        position.0 = line - offset;
        guidelines.push(Guideline {
            axis: GuidelineAxis::Vertical,
            position: line,
        });
    }
    let y_probes = [
        (raw.1, 0.0),
        (center.1, h / 2.0),
        (raw.1 + h, h),
    ];
    if let Some((line, offset)) = best_match(&y_probes, &horizontals, config.snap_distance) {
        position.1 = line - offset;
        guidelines.push(Guideline {
            axis: GuidelineAxis::Horizontal,
            position: line,
        });
    }

    guidelines.truncate(config.max_guidelines);
    SnapFeedback {
        position,
        guidelines,
    }
}

/// Closest (probe, line) pair within `tolerance`. Each probe carries the
/// offset from the shape's top-left, so the caller can place the shape
/// exactly on the line.
fn best_match(
    probes: &[(f32, f32)],
    lines: &[f32],
    tolerance: f32,
) -> Option<(f32, f32)> {
    let mut best: Option<(f32, f32, f32)> = None;
    for &(probe, offset) in probes {
        for &line in lines {
            let gap = (probe - line).abs();
            if gap > tolerance {
                continue;
            }
            if best.is_none_or(|(_, _, b)| gap < b) {
                best = Some((line, offset, gap));
            }
        }
    }
    best.map(|(line, offset, _)| (line, offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeStyle;
    use crate::scene::{ConnectorBindings, SceneObject, ShapeGeometry};

    fn shape(id: &str, x: f32, y: f32, w: f32, h: f32) -> SceneObject {
        SceneObject {
            id: id.to_string(),
            shape: ShapeGeometry::Rect { rounded: true },
            x,
            y,
            width: w,
            height: h,
            label: None,
            style: NodeStyle::default(),
            bindings: ConnectorBindings::default(),
        }
    }

    fn scene_with(objects: Vec<SceneObject>) -> Scene {
        let mut scene = Scene::new(800.0, 600.0);
        for object in objects {
            scene.add_object(object);
        }
        scene
    }

    #[test]
    fn single_target_alignment_is_a_no_op() {
        let mut scene = scene_with(vec![shape("a", 50.0, 50.0, 100.0, 40.0)]);
        align(&mut scene, &["a"], AlignMode::Left).unwrap();
        assert_eq!(scene.object("a").unwrap().x, 50.0);
    }

    #[test]
    fn left_and_top_alignment_use_the_extreme_edge() {
        let mut scene = scene_with(vec![
            shape("a", 50.0, 80.0, 100.0, 40.0),
            shape("b", 120.0, 30.0, 60.0, 40.0),
        ]);
        align(&mut scene, &["a", "b"], AlignMode::Left).unwrap();
        assert_eq!(scene.object("a").unwrap().x, 50.0);
        assert_eq!(scene.object("b").unwrap().x, 50.0);

        align(&mut scene, &["a", "b"], AlignMode::Top).unwrap();
        assert_eq!(scene.object("a").unwrap().y, 30.0);
        assert_eq!(scene.object("b").unwrap().y, 30.0);
    }

    #[test]
    fn center_alignment_averages_the_selection() {
        let mut scene = scene_with(vec![
            shape("a", 0.0, 0.0, 100.0, 40.0),   // center y = 20
            shape("b", 200.0, 60.0, 100.0, 40.0), // center y = 80
        ]);
        align(&mut scene, &["a", "b"], AlignMode::CenterHorizontal).unwrap();
        // Average center y = 50, so both land with center at 50.
        assert_eq!(scene.object("a").unwrap().y, 30.0);
        assert_eq!(scene.object("b").unwrap().y, 30.0);
    }

    #[test]
    fn right_and_bottom_alignment() {
        let mut scene = scene_with(vec![
            shape("a", 0.0, 0.0, 100.0, 40.0),
            shape("b", 150.0, 100.0, 60.0, 80.0),
        ]);
        align(&mut scene, &["a", "b"], AlignMode::Right).unwrap();
        assert_eq!(scene.object("a").unwrap().x, 110.0);
        assert_eq!(scene.object("b").unwrap().x, 150.0);

        align(&mut scene, &["a", "b"], AlignMode::Bottom).unwrap();
        assert_eq!(scene.object("a").unwrap().y + 40.0, 180.0);
        assert_eq!(scene.object("b").unwrap().y + 80.0, 180.0);
    }

    #[test]
    fn snap_waits_for_the_movement_threshold() {
        let scene = scene_with(vec![
            shape("drag", 100.0, 100.0, 100.0, 40.0),
            shape("anchor", 112.0, 300.0, 100.0, 40.0),
        ]);
        let mut engine = SnapEngine::new(SnapConfig::default());
        engine.begin_drag(&scene, "drag", (150.0, 120.0)).unwrap();

        // 5px of travel: under the threshold, shape stays put, no guidelines.
        let feedback = engine.update_drag(&scene, (155.0, 120.0)).unwrap();
        assert_eq!(feedback.position, (100.0, 100.0));
        assert!(feedback.guidelines.is_empty());

        // 20px of travel: engaged, and the left edge (120) snaps to the
        // anchor's left edge at 112.
        let feedback = engine.update_drag(&scene, (170.0, 120.0)).unwrap();
        assert!(feedback
            .guidelines
            .iter()
            .any(|g| g.axis == GuidelineAxis::Vertical && g.position == 112.0));
        assert_eq!(feedback.position.0, 112.0);
    }

    #[test]
    fn update_never_mutates_but_end_commits_the_snap() {
        let mut scene = scene_with(vec![
            shape("drag", 100.0, 100.0, 100.0, 40.0),
            shape("anchor", 300.0, 147.0, 100.0, 40.0),
        ]);
        let mut engine = SnapEngine::new(SnapConfig::default());
        engine.begin_drag(&scene, "drag", (150.0, 120.0)).unwrap();

        engine.update_drag(&scene, (350.0, 120.0));
        assert_eq!(scene.object("drag").unwrap().x, 100.0);

        // Release with the top edge at y=144, 3px off the anchor's top edge
        // guideline at 147: the commit lands exactly on the guideline.
        engine.end_drag(&mut scene, (350.0, 164.0)).unwrap();
        let dragged = scene.object("drag").unwrap();
        assert_eq!(dragged.y, 147.0);
        assert!(engine.dragging().is_none());
    }

    #[test]
    fn canvas_center_is_always_a_guideline_source() {
        let mut scene = scene_with(vec![shape("drag", 100.0, 100.0, 100.0, 40.0)]);
        let mut engine = SnapEngine::new(SnapConfig::default());
        engine.begin_drag(&scene, "drag", (150.0, 120.0)).unwrap();

        // Move so the shape center lands near the canvas vertical center
        // line at x=400: raw center would be 396.
        let feedback = engine.update_drag(&scene, (396.0, 220.0)).unwrap();
        assert!(feedback
            .guidelines
            .iter()
            .any(|g| g.axis == GuidelineAxis::Vertical && g.position == 400.0));
        assert_eq!(feedback.position.0, 350.0);

        engine.end_drag(&mut scene, (396.0, 220.0)).unwrap();
        assert_eq!(scene.object("drag").unwrap().x, 350.0);
    }

    #[test]
    fn connectors_cannot_be_dragged() {
        let mut scene = scene_with(vec![shape("a", 0.0, 0.0, 100.0, 40.0)]);
        scene.add_object(SceneObject {
            id: "c".to_string(),
            shape: ShapeGeometry::Connector {
                points: vec![(0.0, 0.0), (10.0, 10.0)],
                arrowhead: None,
            },
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            label: None,
            style: NodeStyle::default(),
            bindings: ConnectorBindings::default(),
        });
        let mut engine = SnapEngine::new(SnapConfig::default());
        assert_eq!(
            engine.begin_drag(&scene, "c", (0.0, 0.0)).unwrap_err(),
            SceneError::NotAShape("c".to_string())
        );
    }
}
