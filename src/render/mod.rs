//! Render-Schicht: Engine-Schnittstelle, Backends und Lade-Proxy.

pub mod backend;
pub mod cad;
pub mod engine;
pub mod primitive;

pub use backend::{BackendProxy, LoadState, VisualBackend};
pub use cad::CadVisual;
pub use engine::{
    ArticulatedModel, CadLoadStatus, HostCapabilities, HostEnv, MaterialSpec, MeshId, MeshShape,
    MeshSpec, RendererKind, SceneEngine, Transform,
};
pub use primitive::{place_segment, PrimitiveRig};
