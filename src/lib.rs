//! Core engine for a canvas diagramming editor: diagram graph model,
//! deterministic layout and framing, a retained scene graph with live
//! connector bindings, magnetic connection points, and alignment/snap
//! tooling for interactive drags.
//!
//! The pipeline runs graph -> layout -> framing -> scene:
//!
//! ```no_run
//! use flowcanvas::{compute_layout, frame_onto, materialize, Config, Graph, Scene};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let graph = Graph::from_json(r#"{"nodes": [], "edges": []}"#)?;
//! let mut scene = Scene::new(800.0, 600.0);
//!
//! let placed = compute_layout(&graph, &config.layout);
//! let framed = frame_onto(placed, &scene, config.layout.margin);
//! scene.grow_to(framed.width, framed.height);
//! let token = scene.begin_request();
//! materialize(&framed.nodes, &graph.edges, &config.theme, &mut scene, token)?;
//! # Ok(())
//! # }
//! ```

pub mod align;
pub mod config;
pub mod connect;
pub mod error;
pub mod layout;
pub mod model;
pub mod scene;
pub mod theme;

pub use align::{align, AlignMode, Guideline, GuidelineAxis, SnapEngine, SnapFeedback};
pub use config::{load_config, Config, ConnectConfig, LayoutConfig, SnapConfig};
pub use connect::{
    anchor_points, bind, AnchorVisibility, ConnectEvent, ConnectionPoints, ConnectorEnd,
};
pub use error::{GraphError, SceneError};
pub use layout::{append_offset, compute_layout, frame, frame_onto, Framed};
pub use model::{Edge, EdgeKind, Graph, Node, NodeKind, NodeStyle};
pub use scene::{
    materialize, materialize_into, RequestToken, Scene, SceneEvent, SceneObject, ShapeGeometry,
};
pub use theme::Theme;
