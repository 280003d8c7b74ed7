pub mod adapter;

pub use adapter::{materialize, materialize_into};

use serde::{Deserialize, Serialize};

use crate::error::SceneError;
use crate::model::NodeStyle;

/// Concrete drawable geometry. `Rect`/`Ellipse`/`Polygon` are positioned by
/// the owning object's top-left box; polygon points are relative to it.
/// `Connector` points are absolute scene coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeGeometry {
    Rect {
        rounded: bool,
    },
    Ellipse,
    Polygon {
        points: Vec<(f32, f32)>,
    },
    Connector {
        points: Vec<(f32, f32)>,
        arrowhead: Option<[(f32, f32); 3]>,
    },
}

/// Live relation from one connector endpoint to an anchor on a shape. The
/// connector never owns the shape, it only observes its geometry: the
/// endpoint is recomputed from the shape's current bounding box on every
/// move/resize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    pub shape_id: String,
    pub anchor_index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectorBindings {
    #[serde(default)]
    pub start: Option<Binding>,
    #[serde(default)]
    pub end: Option<Binding>,
}

impl ConnectorBindings {
    pub fn references(&self, shape_id: &str) -> bool {
        self.start
            .as_ref()
            .is_some_and(|b| b.shape_id == shape_id)
            || self.end.as_ref().is_some_and(|b| b.shape_id == shape_id)
    }
}

/// One selectable unit on the canvas: shape plus centered label, under a
/// stable id (the graph node id survives materialization).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub id: String,
    pub shape: ShapeGeometry,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub style: NodeStyle,
    #[serde(default)]
    pub bindings: ConnectorBindings,
}

impl SceneObject {
    pub fn is_connector(&self) -> bool {
        matches!(self.shape, ShapeGeometry::Connector { .. })
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Local mutation notifications handed to the collaboration collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    Added(String),
    Modified(String),
    Removed(String),
}

pub type Listener = Box<dyn FnMut(&SceneEvent)>;

/// Ticket for one load/materialize request. A request superseded by a newer
/// `begin_request` is silently discarded when applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

#[derive(Serialize, Deserialize)]
struct SceneSnapshot {
    width: f32,
    height: f32,
    objects: Vec<SceneObject>,
}

/// The single mutable scene graph. Every component receives it explicitly;
/// there is no ambient canvas singleton. Single-threaded discipline: only
/// sequential event-driven mutation, last writer wins.
pub struct Scene {
    objects: Vec<SceneObject>,
    width: f32,
    height: f32,
    generation: u64,
    listeners: Vec<Listener>,
    repaint_needed: bool,
}

impl Scene {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            objects: Vec::new(),
            width,
            height,
            generation: 0,
            listeners: Vec::new(),
            repaint_needed: false,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Grows the canvas to at least the given size; it never shrinks.
    pub fn grow_to(&mut self, width: f32, height: f32) {
        self.width = self.width.max(width);
        self.height = self.height.max(height);
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn object(&self, id: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub(crate) fn object_mut(&mut self, id: &str) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn add_object(&mut self, object: SceneObject) {
        let id = object.id.clone();
        self.objects.push(object);
        self.emit(SceneEvent::Added(id));
    }

    pub fn move_object(&mut self, id: &str, dx: f32, dy: f32) -> Result<(), SceneError> {
        let object = self
            .object_mut(id)
            .ok_or_else(|| SceneError::UnknownObject(id.to_string()))?;
        translate(object, dx, dy);
        let is_connector = object.is_connector();
        self.emit(SceneEvent::Modified(id.to_string()));
        if !is_connector {
            crate::connect::refresh_bindings(self, id);
        }
        Ok(())
    }

    pub fn set_object_position(&mut self, id: &str, x: f32, y: f32) -> Result<(), SceneError> {
        let object = self
            .object(id)
            .ok_or_else(|| SceneError::UnknownObject(id.to_string()))?;
        let dx = x - object.x;
        let dy = y - object.y;
        self.move_object(id, dx, dy)
    }

    pub fn resize_object(&mut self, id: &str, width: f32, height: f32) -> Result<(), SceneError> {
        let object = self
            .object_mut(id)
            .ok_or_else(|| SceneError::UnknownObject(id.to_string()))?;
        if object.is_connector() {
            return Err(SceneError::CannotResizeConnector(id.to_string()));
        }
        object.width = width;
        object.height = height;
        self.emit(SceneEvent::Modified(id.to_string()));
        crate::connect::refresh_bindings(self, id);
        Ok(())
    }

    /// Removes an object. Connectors bound to a removed shape are removed
    /// with it: a floating half-connection is never left behind, and every
    /// surviving binding still resolves.
    pub fn remove_object(&mut self, id: &str) -> Result<(), SceneError> {
        let idx = self
            .objects
            .iter()
            .position(|o| o.id == id)
            .ok_or_else(|| SceneError::UnknownObject(id.to_string()))?;
        let removed = self.objects.remove(idx);
        self.emit(SceneEvent::Removed(removed.id.clone()));

        if !removed.is_connector() {
            let orphaned: Vec<String> = self
                .objects
                .iter()
                .filter(|o| o.is_connector() && o.bindings.references(id))
                .map(|o| o.id.clone())
                .collect();
            for connector_id in orphaned {
                self.objects.retain(|o| o.id != connector_id);
                self.emit(SceneEvent::Removed(connector_id));
            }
        }
        Ok(())
    }

    pub fn subscribe(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    pub(crate) fn emit(&mut self, event: SceneEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    pub(crate) fn notify_modified(&mut self, id: &str) {
        self.emit(SceneEvent::Modified(id.to_string()));
    }

    /// Starts a new load/materialize request, invalidating any token handed
    /// out earlier.
    pub fn begin_request(&mut self) -> RequestToken {
        self.generation += 1;
        RequestToken(self.generation)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.generation
    }

    pub fn request_repaint(&mut self) {
        self.repaint_needed = true;
    }

    /// Returns and clears the pending repaint flag. The host repaints once
    /// per batch, not once per inserted object.
    pub fn take_repaint(&mut self) -> bool {
        std::mem::take(&mut self.repaint_needed)
    }

    /// Serialized form handed to the persistence collaborator. The blob is
    /// opaque to callers and round-trips through `from_json`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&SceneSnapshot {
            width: self.width,
            height: self.height,
            objects: self.objects.clone(),
        })
    }

    pub fn from_json(input: &str) -> serde_json::Result<Self> {
        let snapshot: SceneSnapshot = serde_json::from_str(input)?;
        let mut scene = Scene::new(snapshot.width, snapshot.height);
        scene.objects = snapshot.objects;
        Ok(scene)
    }
}

fn translate(object: &mut SceneObject, dx: f32, dy: f32) {
    object.x += dx;
    object.y += dy;
    if let ShapeGeometry::Connector { points, arrowhead } = &mut object.shape {
        for point in points.iter_mut() {
            point.0 += dx;
            point.1 += dy;
        }
        if let Some(head) = arrowhead {
            for point in head.iter_mut() {
                point.0 += dx;
                point.1 += dy;
            }
        }
    }
}
