use thiserror::Error;

/// Errors raised while constructing or validating a diagram graph.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("duplicate node id `{0}`")]
    DuplicateNode(String),
    #[error("node `{id}` has degenerate geometry ({width}x{height})")]
    DegenerateGeometry { id: String, width: f32, height: f32 },
    #[error("edge references missing node `{0}`")]
    MissingEndpoint(String),
    #[error("self-loop on node `{0}` is not permitted")]
    SelfLoop(String),
}

/// Errors raised by scene mutation entry points.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("no drawing surface attached")]
    NoSurface,
    #[error("unknown scene object `{0}`")]
    UnknownObject(String),
    #[error("object `{0}` is not a connector")]
    NotAConnector(String),
    #[error("object `{0}` is a connector, not a shape")]
    NotAShape(String),
    #[error("connector `{0}` cannot be resized")]
    CannotResizeConnector(String),
}
