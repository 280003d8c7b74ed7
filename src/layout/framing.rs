use crate::model::Node;
use crate::scene::Scene;

/// Result of the framing stage: translated nodes plus the canvas size needed
/// to contain them.
#[derive(Debug, Clone, PartialEq)]
pub struct Framed {
    pub nodes: Vec<Node>,
    pub width: f32,
    pub height: f32,
}

/// Translates `nodes` so their bounding box sits at `(margin, margin)` and
/// computes the canvas size required to hold them. The canvas never shrinks:
/// the returned size is at least `canvas_width` x `canvas_height`.
pub fn frame(mut nodes: Vec<Node>, canvas_width: f32, canvas_height: f32, margin: f32) -> Framed {
    let Some(bounds) = bounding_box(&nodes) else {
        return Framed {
            nodes,
            width: canvas_width,
            height: canvas_height,
        };
    };
    let (min_x, min_y, max_x, max_y) = bounds;

    let dx = margin - min_x;
    let dy = margin - min_y;
    for node in &mut nodes {
        node.x += dx;
        node.y += dy;
    }

    Framed {
        nodes,
        width: canvas_width.max(max_x - min_x + 2.0 * margin),
        height: canvas_height.max(max_y - min_y + 2.0 * margin),
    }
}

/// Rightmost extent of the scene's existing shapes. Connectors are ignored:
/// a long edge must not push appended content further right.
pub fn append_offset(scene: &Scene) -> f32 {
    scene
        .objects()
        .iter()
        .filter(|object| !object.is_connector())
        .map(|object| object.x + object.width)
        .fold(0.0, f32::max)
}

/// Frames `nodes` against the scene's current size, then shifts them right of
/// whatever the scene already contains so a second template never overlaps
/// the first.
pub fn frame_onto(nodes: Vec<Node>, scene: &Scene, margin: f32) -> Framed {
    let offset = append_offset(scene);
    let mut framed = frame(nodes, scene.width(), scene.height(), margin);
    if offset > 0.0 && !framed.nodes.is_empty() {
        let mut max_x = 0.0f32;
        for node in &mut framed.nodes {
            node.x += offset;
            max_x = max_x.max(node.x + node.width);
        }
        framed.width = framed.width.max(max_x + margin);
    }
    framed
}

fn bounding_box(nodes: &[Node]) -> Option<(f32, f32, f32, f32)> {
    let first = nodes.first()?;
    let mut min_x = first.x;
    let mut min_y = first.y;
    let mut max_x = first.right();
    let mut max_y = first.bottom();
    for node in &nodes[1..] {
        min_x = min_x.min(node.x);
        min_y = min_y.min(node.y);
        max_x = max_x.max(node.right());
        max_y = max_y.max(node.bottom());
    }
    Some((min_x, min_y, max_x, max_y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeKind;

    fn node(id: &str, x: f32, y: f32) -> Node {
        Node::new(id, NodeKind::Process, 100.0, 50.0)
            .unwrap()
            .at(x, y)
    }

    #[test]
    fn centering_puts_bounding_box_at_margin() {
        let nodes = vec![node("a", -40.0, 300.0), node("b", 500.0, -20.0)];
        let framed = frame(nodes, 800.0, 600.0, 60.0);
        let min_x = framed
            .nodes
            .iter()
            .map(|n| n.x)
            .fold(f32::INFINITY, f32::min);
        let min_y = framed
            .nodes
            .iter()
            .map(|n| n.y)
            .fold(f32::INFINITY, f32::min);
        assert_eq!(min_x, 60.0);
        assert_eq!(min_y, 60.0);
    }

    #[test]
    fn canvas_never_shrinks() {
        let framed = frame(vec![node("a", 0.0, 0.0)], 1600.0, 1200.0, 60.0);
        assert_eq!(framed.width, 1600.0);
        assert_eq!(framed.height, 1200.0);

        let wide = vec![node("a", 0.0, 0.0), node("b", 3000.0, 0.0)];
        let framed = frame(wide, 800.0, 600.0, 60.0);
        assert!(framed.width >= 3220.0);
        assert!(framed.height >= 600.0);
    }

    #[test]
    fn empty_node_set_is_untouched() {
        let framed = frame(Vec::new(), 800.0, 600.0, 60.0);
        assert!(framed.nodes.is_empty());
        assert_eq!(framed.width, 800.0);
        assert_eq!(framed.height, 600.0);
    }
}
