use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use super::{ConnectorBindings, RequestToken, Scene, SceneObject, ShapeGeometry};
use crate::error::SceneError;
use crate::model::{Edge, EdgeKind, Node, NodeKind};
use crate::theme::Theme;

type GeometryFactory = fn(&Node) -> ShapeGeometry;

// The only place shape identity is decided. Everything downstream works on
// concrete geometry, never on node kinds.
static SHAPE_FACTORIES: Lazy<BTreeMap<NodeKind, GeometryFactory>> = Lazy::new(|| {
    BTreeMap::from([
        (NodeKind::Start, ellipse as GeometryFactory),
        (NodeKind::End, ellipse),
        (NodeKind::Decision, diamond),
        (NodeKind::Process, rounded_rect),
        (NodeKind::Custom, rounded_rect),
        (NodeKind::Actor, rounded_rect),
        (NodeKind::Entity, plain_rect),
        (NodeKind::Note, plain_rect),
    ])
});

fn ellipse(_node: &Node) -> ShapeGeometry {
    ShapeGeometry::Ellipse
}

fn rounded_rect(_node: &Node) -> ShapeGeometry {
    ShapeGeometry::Rect { rounded: true }
}

fn plain_rect(_node: &Node) -> ShapeGeometry {
    ShapeGeometry::Rect { rounded: false }
}

fn diamond(node: &Node) -> ShapeGeometry {
    let w = node.width;
    let h = node.height;
    ShapeGeometry::Polygon {
        points: vec![(w / 2.0, 0.0), (w, h / 2.0), (w / 2.0, h), (0.0, h / 2.0)],
    }
}

/// Entry point for hosts that may not have a live surface yet: fails fast
/// with `NoSurface` instead of silently dropping the diagram.
pub fn materialize_into(
    scene: Option<&mut Scene>,
    nodes: &[Node],
    edges: &[Edge],
    theme: &Theme,
    token: RequestToken,
) -> Result<(), SceneError> {
    let scene = scene.ok_or(SceneError::NoSurface)?;
    materialize(nodes, edges, theme, scene, token)
}

/// Inserts positioned nodes and their edges into the live scene. Nodes go in
/// first so edge endpoint lookups by id succeed; an edge whose endpoint is
/// missing is skipped with a warning rather than failing the whole diagram.
/// One repaint is requested for the batch, not one per object.
pub fn materialize(
    nodes: &[Node],
    edges: &[Edge],
    theme: &Theme,
    scene: &mut Scene,
    token: RequestToken,
) -> Result<(), SceneError> {
    if !scene.is_current(token) {
        log::debug!("discarding superseded materialization request");
        return Ok(());
    }

    for node in nodes {
        scene.add_object(node_object(node, theme));
    }

    for (idx, edge) in edges.iter().enumerate() {
        let endpoints = match (scene.object(&edge.source), scene.object(&edge.target)) {
            (Some(source), Some(target)) => {
                // Orthogonal default: leave the source at its bottom-center,
                // arrive at the target's top-center.
                let start = (source.x + source.width / 2.0, source.y + source.height);
                let end = (target.x + target.width / 2.0, target.y);
                Some((start, end))
            }
            _ => None,
        };
        let Some((start, end)) = endpoints else {
            log::warn!(
                "skipping edge {} -> {}: endpoint missing from scene",
                edge.source,
                edge.target
            );
            continue;
        };
        scene.add_object(connector_object(idx, edge, start, end, theme));
    }

    scene.request_repaint();
    Ok(())
}

fn node_object(node: &Node, theme: &Theme) -> SceneObject {
    let factory = SHAPE_FACTORIES
        .get(&node.kind)
        .copied()
        .unwrap_or(rounded_rect);
    SceneObject {
        id: node.id.clone(),
        shape: factory(node),
        x: node.x,
        y: node.y,
        width: node.width,
        height: node.height,
        label: node.label.clone(),
        style: theme.resolve_style(node.kind, node.style.as_ref()),
        bindings: ConnectorBindings::default(),
    }
}

fn connector_object(
    idx: usize,
    edge: &Edge,
    start: (f32, f32),
    end: (f32, f32),
    theme: &Theme,
) -> SceneObject {
    let arrowhead = match edge.kind {
        EdgeKind::Arrow => Some(arrowhead_points(start, end, theme.arrow_size)),
        EdgeKind::Plain => None,
    };
    let points = vec![start, end];
    let (x, y, width, height) = points_bbox(&points);
    SceneObject {
        id: format!("{}->{}#{idx}", edge.source, edge.target),
        shape: ShapeGeometry::Connector { points, arrowhead },
        x,
        y,
        width,
        height,
        label: edge.label.clone(),
        style: crate::model::NodeStyle {
            stroke: Some(theme.line_color.clone()),
            text_color: Some(theme.text_color.clone()),
            ..Default::default()
        },
        bindings: ConnectorBindings::default(),
    }
}

/// Triangle oriented along the segment, tip touching the end point.
pub(crate) fn arrowhead_points(
    start: (f32, f32),
    end: (f32, f32),
    size: f32,
) -> [(f32, f32); 3] {
    let angle = (end.1 - start.1).atan2(end.0 - start.0);
    let spread = 0.45f32;
    let left = (
        end.0 - size * (angle - spread).cos(),
        end.1 - size * (angle - spread).sin(),
    );
    let right = (
        end.0 - size * (angle + spread).cos(),
        end.1 - size * (angle + spread).sin(),
    );
    [end, left, right]
}

pub(crate) fn points_bbox(points: &[(f32, f32)]) -> (f32, f32, f32, f32) {
    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for (x, y) in points {
        min_x = min_x.min(*x);
        min_y = min_y.min(*y);
        max_x = max_x.max(*x);
        max_y = max_y.max(*y);
    }
    if points.is_empty() {
        return (0.0, 0.0, 0.0, 0.0);
    }
    (min_x, min_y, max_x - min_x, max_y - min_y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Graph;

    fn node(id: &str, kind: NodeKind, x: f32, y: f32) -> Node {
        Node::new(id, kind, 100.0, 50.0).unwrap().at(x, y)
    }

    #[test]
    fn kinds_map_to_expected_geometry() {
        let theme = Theme::audit_default();
        let start = node_object(&node("s", NodeKind::Start, 0.0, 0.0), &theme);
        assert_eq!(start.shape, ShapeGeometry::Ellipse);

        let decision = node_object(&node("d", NodeKind::Decision, 0.0, 0.0), &theme);
        let ShapeGeometry::Polygon { points } = &decision.shape else {
            panic!("decision should be a polygon");
        };
        assert_eq!(points.len(), 4);
        assert_eq!(points[0], (50.0, 0.0));
        assert_eq!(points[1], (100.0, 25.0));

        let process = node_object(&node("p", NodeKind::Process, 0.0, 0.0), &theme);
        assert_eq!(process.shape, ShapeGeometry::Rect { rounded: true });
    }

    #[test]
    fn edges_connect_bottom_center_to_top_center() {
        let mut scene = Scene::new(800.0, 600.0);
        let token = scene.begin_request();
        let nodes = vec![
            node("a", NodeKind::Process, 100.0, 100.0),
            node("b", NodeKind::Process, 100.0, 300.0),
        ];
        let edges = vec![Edge::new("a", "b")];
        materialize(&nodes, &edges, &Theme::audit_default(), &mut scene, token).unwrap();

        let connector = scene.object("a->b#0").unwrap();
        let ShapeGeometry::Connector { points, arrowhead } = &connector.shape else {
            panic!("expected connector");
        };
        assert_eq!(points[0], (150.0, 150.0));
        assert_eq!(points[1], (150.0, 300.0));
        // Arrow tip touches the end point.
        assert_eq!(arrowhead.unwrap()[0], (150.0, 300.0));
    }

    #[test]
    fn dangling_edge_is_skipped_not_fatal() {
        let mut scene = Scene::new(800.0, 600.0);
        let token = scene.begin_request();
        let nodes = vec![node("a", NodeKind::Process, 0.0, 0.0)];
        let edges = vec![Edge::new("a", "ghost"), Edge::new("ghost", "a")];
        materialize(&nodes, &edges, &Theme::audit_default(), &mut scene, token).unwrap();

        assert!(scene.object("a").is_some());
        assert_eq!(scene.objects().len(), 1);
    }

    #[test]
    fn stale_request_is_discarded() {
        let mut scene = Scene::new(800.0, 600.0);
        let stale = scene.begin_request();
        let _newer = scene.begin_request();
        let nodes = vec![node("a", NodeKind::Process, 0.0, 0.0)];
        materialize(&nodes, &[], &Theme::audit_default(), &mut scene, stale).unwrap();
        assert!(scene.objects().is_empty());
    }

    #[test]
    fn missing_surface_fails_fast() {
        let graph = Graph::new();
        let err = materialize_into(
            None,
            &graph.nodes,
            &graph.edges,
            &Theme::audit_default(),
            RequestToken(1),
        )
        .unwrap_err();
        assert_eq!(err, SceneError::NoSurface);
    }

    #[test]
    fn one_repaint_per_batch() {
        let mut scene = Scene::new(800.0, 600.0);
        let token = scene.begin_request();
        let nodes = vec![
            node("a", NodeKind::Process, 0.0, 0.0),
            node("b", NodeKind::Process, 200.0, 0.0),
        ];
        materialize(&nodes, &[], &Theme::audit_default(), &mut scene, token).unwrap();
        assert!(scene.take_repaint());
        assert!(!scene.take_repaint());
    }
}
