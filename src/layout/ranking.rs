use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::model::{Edge, Node};

/// Assigns every node a rank (layer). Ranks follow the longest path over
/// forward edges of a deterministic topological order; sources sit at rank 0
/// and isolated nodes keep their own rank 0 slot. Declaration order is the
/// tie-break throughout, so the same graph always ranks the same way.
pub(super) fn assign_ranks(nodes: &[Node], edges: &[Edge]) -> HashMap<String, usize> {
    let node_order: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| (node.id.as_str(), idx))
        .collect();
    let order_key = |id: &str| node_order.get(id).copied().unwrap_or(usize::MAX);

    let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut indeg: HashMap<&str, usize> = HashMap::new();
    for node in nodes {
        indeg.insert(node.id.as_str(), 0);
    }
    for edge in edges {
        if !node_order.contains_key(edge.source.as_str())
            || !node_order.contains_key(edge.target.as_str())
        {
            continue;
        }
        adj.entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
        *indeg.entry(edge.target.as_str()).or_insert(0) += 1;
    }

    let mut ready: BinaryHeap<Reverse<(usize, &str)>> = BinaryHeap::new();
    for node in nodes {
        if indeg[node.id.as_str()] == 0 {
            ready.push(Reverse((order_key(&node.id), node.id.as_str())));
        }
    }

    let mut order: Vec<&str> = Vec::with_capacity(nodes.len());
    let mut processed: HashSet<&str> = HashSet::new();
    loop {
        while let Some(Reverse((_key, id))) = ready.pop() {
            if processed.contains(id) {
                continue;
            }
            order.push(id);
            processed.insert(id);
            if let Some(nexts) = adj.get(id) {
                for next in nexts {
                    if processed.contains(next) {
                        continue;
                    }
                    if let Some(deg) = indeg.get_mut(next) {
                        *deg = deg.saturating_sub(1);
                        if *deg == 0 {
                            ready.push(Reverse((order_key(next), next)));
                        }
                    }
                }
            }
        }

        if processed.len() >= nodes.len() {
            break;
        }

        // Cycle: treat the earliest-declared remaining node as the next
        // source and its incoming edges as back-edges.
        let next = nodes
            .iter()
            .map(|node| node.id.as_str())
            .find(|id| !processed.contains(id));
        match next {
            Some(id) => ready.push(Reverse((order_key(id), id))),
            None => break,
        }
    }

    let order_index: HashMap<&str, usize> = order
        .iter()
        .enumerate()
        .map(|(idx, id)| (*id, idx))
        .collect();

    let mut ranks: HashMap<String, usize> = HashMap::new();
    for id in &order {
        let rank = *ranks.get(*id).unwrap_or(&0);
        ranks.entry((*id).to_string()).or_insert(rank);
        let Some(nexts) = adj.get(id) else {
            continue;
        };
        let from_idx = order_index[id];
        for next in nexts {
            // Back-edges (target earlier in topo order) do not push ranks.
            if order_index.get(next).copied().unwrap_or(from_idx) <= from_idx {
                continue;
            }
            let entry = ranks.entry((*next).to_string()).or_insert(0);
            *entry = (*entry).max(rank + 1);
        }
    }

    ranks
}

/// Reduces edge crossings by re-sorting each rank bucket around the median
/// position of its neighbors in the adjacent rank, sweeping forward then
/// backward for `passes` rounds. Ties fall back to the current position and
/// then declaration order, keeping the result deterministic.
pub(super) fn order_rank_nodes(
    rank_nodes: &mut [Vec<String>],
    edges: &[Edge],
    node_order: &HashMap<String, usize>,
    passes: usize,
) {
    if rank_nodes.len() <= 1 {
        return;
    }

    let mut incoming: HashMap<String, Vec<String>> = HashMap::new();
    let mut outgoing: HashMap<String, Vec<String>> = HashMap::new();
    for edge in edges {
        outgoing
            .entry(edge.source.clone())
            .or_default()
            .push(edge.target.clone());
        incoming
            .entry(edge.target.clone())
            .or_default()
            .push(edge.source.clone());
    }

    let mut positions: HashMap<String, usize> = HashMap::new();
    let update_positions =
        |rank_nodes: &[Vec<String>], positions: &mut HashMap<String, usize>| {
            positions.clear();
            for bucket in rank_nodes.iter() {
                for (idx, id) in bucket.iter().enumerate() {
                    positions.insert(id.clone(), idx);
                }
            }
        };
    update_positions(rank_nodes, &mut positions);

    let sort_bucket = |bucket: &mut Vec<String>,
                       neighbors: &HashMap<String, Vec<String>>,
                       positions: &HashMap<String, usize>| {
        let current: HashMap<String, usize> = bucket
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.clone(), idx))
            .collect();
        bucket.sort_by(|a, b| {
            let a_score = median_position(a, neighbors, positions, &current);
            let b_score = median_position(b, neighbors, positions, &current);
            match a_score.partial_cmp(&b_score) {
                Some(std::cmp::Ordering::Equal) | None => {
                    let a_pos = current.get(a).copied().unwrap_or(0);
                    let b_pos = current.get(b).copied().unwrap_or(0);
                    match a_pos.cmp(&b_pos) {
                        std::cmp::Ordering::Equal => node_order
                            .get(a)
                            .copied()
                            .unwrap_or(usize::MAX)
                            .cmp(&node_order.get(b).copied().unwrap_or(usize::MAX)),
                        other => other,
                    }
                }
                Some(ordering) => ordering,
            }
        });
    };

    let passes = passes.max(1);
    for _ in 0..passes {
        for rank in 1..rank_nodes.len() {
            if rank_nodes[rank].len() <= 1 {
                continue;
            }
            sort_bucket(&mut rank_nodes[rank], &incoming, &positions);
            update_positions(rank_nodes, &mut positions);
        }
        for rank in (0..rank_nodes.len().saturating_sub(1)).rev() {
            if rank_nodes[rank].len() <= 1 {
                continue;
            }
            sort_bucket(&mut rank_nodes[rank], &outgoing, &positions);
            update_positions(rank_nodes, &mut positions);
        }
    }
}

fn median_position(
    id: &str,
    neighbors: &HashMap<String, Vec<String>>,
    positions: &HashMap<String, usize>,
    current: &HashMap<String, usize>,
) -> f32 {
    let Some(list) = neighbors.get(id) else {
        return *current.get(id).unwrap_or(&0) as f32;
    };
    let mut values: Vec<f32> = list
        .iter()
        .filter_map(|neighbor| positions.get(neighbor))
        .map(|pos| *pos as f32)
        .collect();
    if values.is_empty() {
        return *current.get(id).unwrap_or(&0) as f32;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) * 0.5
    }
}
