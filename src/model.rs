use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::GraphError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Start,
    End,
    Process,
    Decision,
    Custom,
    Actor,
    Entity,
    Note,
}

/// Fill/stroke/text overrides for a single node. Unset fields fall back to
/// the theme's per-kind defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeStyle {
    #[serde(default)]
    pub fill: Option<String>,
    #[serde(default)]
    pub stroke: Option<String>,
    #[serde(default)]
    pub text_color: Option<String>,
}

/// One diagram element. Geometry is top-left based: `x`/`y` hold whatever the
/// template supplied before layout, and the final position afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub style: Option<NodeStyle>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Node {
    pub fn new(
        id: impl Into<String>,
        kind: NodeKind,
        width: f32,
        height: f32,
    ) -> Result<Self, GraphError> {
        let id = id.into();
        if width <= 0.0 || height <= 0.0 {
            return Err(GraphError::DegenerateGeometry { id, width, height });
        }
        Ok(Self {
            id,
            kind,
            x: 0.0,
            y: 0.0,
            width,
            height,
            label: None,
            style: None,
            metadata: BTreeMap::new(),
        })
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_style(mut self, style: NodeStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Plain,
    Arrow,
}

impl Default for EdgeKind {
    fn default() -> Self {
        Self::Arrow
    }
}

/// Directed relation between two nodes of the same graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub kind: EdgeKind,
    #[serde(default)]
    pub label: Option<String>,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind: EdgeKind::default(),
            label: None,
        }
    }

    pub fn plain(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            kind: EdgeKind::Plain,
            ..Self::new(source, target)
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// One diagram unit: an ordered node list plus edges. Node insertion order is
/// the tie-break everywhere (row packing order, rank assignment) so a given
/// template always lays out the same way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.nodes.iter().any(|n| n.id == node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        self.nodes.push(node);
        Ok(())
    }

    pub fn add_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        if edge.source == edge.target {
            return Err(GraphError::SelfLoop(edge.source));
        }
        if self.node(&edge.source).is_none() {
            return Err(GraphError::MissingEndpoint(edge.source));
        }
        if self.node(&edge.target).is_none() {
            return Err(GraphError::MissingEndpoint(edge.target));
        }
        self.edges.push(edge);
        Ok(())
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Re-checks every construction invariant. Needed for graphs that arrive
    /// whole (template JSON) instead of through `add_node`/`add_edge`.
    pub fn validate(&self) -> Result<(), GraphError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for node in &self.nodes {
            if node.width <= 0.0 || node.height <= 0.0 {
                return Err(GraphError::DegenerateGeometry {
                    id: node.id.clone(),
                    width: node.width,
                    height: node.height,
                });
            }
            if !seen.insert(node.id.as_str()) {
                return Err(GraphError::DuplicateNode(node.id.clone()));
            }
        }
        for edge in &self.edges {
            if edge.source == edge.target {
                return Err(GraphError::SelfLoop(edge.source.clone()));
            }
            for endpoint in [&edge.source, &edge.target] {
                if !seen.contains(endpoint.as_str()) {
                    return Err(GraphError::MissingEndpoint(endpoint.clone()));
                }
            }
        }
        Ok(())
    }

    /// Parses a template catalog entry (`{"nodes": [...], "edges": [...]}`)
    /// and validates it.
    pub fn from_json(input: &str) -> anyhow::Result<Self> {
        let graph: Graph = serde_json::from_str(input)?;
        graph.validate()?;
        Ok(graph)
    }
}
