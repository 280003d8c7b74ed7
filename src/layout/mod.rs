mod framing;
mod ranking;

pub use framing::{Framed, append_offset, frame, frame_onto};

use std::collections::HashMap;

use crate::config::LayoutConfig;
use crate::model::{Graph, Node};

/// Positions every node of `graph` and returns the placed copies. Pure: the
/// input graph is untouched and the same input always yields the same output.
///
/// Graphs without edges are packed left-to-right on a fixed row in insertion
/// order; graphs with edges go through the layered left-to-right layout.
pub fn compute_layout(graph: &Graph, config: &LayoutConfig) -> Vec<Node> {
    if graph.edges.is_empty() {
        pack_row(graph, config)
    } else {
        layered(graph, config)
    }
}

fn pack_row(graph: &Graph, config: &LayoutConfig) -> Vec<Node> {
    let mut x = config.margin;
    graph
        .nodes
        .iter()
        .map(|node| {
            let mut placed = node.clone();
            placed.x = x;
            placed.y = config.row_y;
            x += placed.width + config.node_spacing;
            placed
        })
        .collect()
}

fn layered(graph: &Graph, config: &LayoutConfig) -> Vec<Node> {
    let ranks = ranking::assign_ranks(&graph.nodes, &graph.edges);
    let max_rank = ranks.values().copied().max().unwrap_or(0);

    // Bucket node ids by rank, preserving declaration order inside a bucket.
    let mut rank_nodes: Vec<Vec<String>> = vec![Vec::new(); max_rank + 1];
    for node in &graph.nodes {
        let rank = *ranks.get(&node.id).unwrap_or(&0);
        rank_nodes[rank].push(node.id.clone());
    }

    let node_order: HashMap<String, usize> = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| (node.id.clone(), idx))
        .collect();
    ranking::order_rank_nodes(
        &mut rank_nodes,
        &graph.edges,
        &node_order,
        config.order_passes,
    );

    let by_id: HashMap<&str, &Node> = graph
        .nodes
        .iter()
        .map(|node| (node.id.as_str(), node))
        .collect();

    // Rank flow is horizontal: each rank occupies a column whose width is its
    // widest node; nodes stack vertically inside the column.
    let rank_widths: Vec<f32> = rank_nodes
        .iter()
        .map(|bucket| {
            bucket
                .iter()
                .filter_map(|id| by_id.get(id.as_str()))
                .map(|node| node.width)
                .fold(0.0, f32::max)
        })
        .collect();
    let rank_heights: Vec<f32> = rank_nodes
        .iter()
        .map(|bucket| {
            let total: f32 = bucket
                .iter()
                .filter_map(|id| by_id.get(id.as_str()))
                .map(|node| node.height)
                .sum();
            let gaps = bucket.len().saturating_sub(1) as f32 * config.in_rank_spacing;
            total + gaps
        })
        .collect();
    let tallest = rank_heights.iter().copied().fold(0.0, f32::max);

    let mut positions: HashMap<String, (f32, f32)> = HashMap::new();
    let mut column_x = config.margin;
    for (rank, bucket) in rank_nodes.iter().enumerate() {
        let center_x = column_x + rank_widths[rank] / 2.0;
        // Shorter ranks float to the vertical middle of the tallest rank.
        let mut y = config.row_y + (tallest - rank_heights[rank]) / 2.0;
        for id in bucket {
            let Some(node) = by_id.get(id.as_str()) else {
                continue;
            };
            let center_y = y + node.height / 2.0;
            positions.insert(id.clone(), (center_x, center_y));
            y += node.height + config.in_rank_spacing;
        }
        column_x += rank_widths[rank] + config.rank_spacing;
    }

    // The layout centers on a point; the model stores top-left.
    graph
        .nodes
        .iter()
        .map(|node| {
            let mut placed = node.clone();
            if let Some((cx, cy)) = positions.get(&node.id) {
                placed.x = cx - node.width / 2.0;
                placed.y = cy - node.height / 2.0;
            }
            placed
        })
        .collect()
}
