//! Schnittstelle zur externen 3D-Engine.
//!
//! Die Engine selbst (Szene, Shader, Canvas) liefert der Host; dieser Kern
//! spricht sie ausschließlich über diese Traits an und bleibt dadurch
//! unabhängig von der konkreten Render-Implementierung.

use glam::{Quat, Vec3};

use crate::config::ModelConfig;

/// Handle eines von der Engine verwalteten Meshes.
pub type MeshId = u32;

/// Geometrie eines Primitiv-Meshes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeshShape {
    /// Quader mit vollen Kantenlängen
    Box { width: f32, height: f32, depth: f32 },
    /// Zylinder entlang +Y, optional konisch
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
    },
    Sphere { radius: f32 },
}

/// Materialparameter eines Meshes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialSpec {
    pub color: [f32; 4],
    pub roughness: f32,
    pub metalness: f32,
    /// Eigenleuchten in Farbton des Materials; `0.0` = aus
    pub emissive_intensity: f32,
}

impl MaterialSpec {
    pub fn standard(color: [f32; 4], roughness: f32, metalness: f32) -> Self {
        Self {
            color,
            roughness,
            metalness,
            emissive_intensity: 0.0,
        }
    }

    pub fn emissive(color: [f32; 4], roughness: f32, metalness: f32, intensity: f32) -> Self {
        Self {
            color,
            roughness,
            metalness,
            emissive_intensity: intensity,
        }
    }
}

/// Beschreibung eines anzulegenden Meshes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshSpec {
    pub shape: MeshShape,
    pub material: MaterialSpec,
}

/// Starrkörper-Transform eines Meshes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }
}

/// Ergebnis eines CAD-Lade-Polls.
pub enum CadLoadStatus {
    /// Das Asset wird noch geladen.
    Pending,
    /// Laden abgeschlossen; die Engine gibt das Modell genau einmal heraus.
    Ready(Box<dyn ArticulatedModel>),
    /// Laden endgültig fehlgeschlagen.
    Failed(anyhow::Error),
}

/// Minimale Szenen-Schnittstelle, die der Host bereitstellt.
pub trait SceneEngine {
    /// Legt ein Mesh an und gibt sein Handle zurück.
    fn add_mesh(&mut self, spec: &MeshSpec) -> MeshId;

    /// Entfernt ein Mesh samt Geometrie und Material aus der Szene.
    fn remove_mesh(&mut self, mesh: MeshId);

    fn set_transform(&mut self, mesh: MeshId, transform: Transform);

    fn set_visible(&mut self, mesh: MeshId, visible: bool);

    /// Reicht den aktuellen Szenenzustand zum Zeichnen ein.
    fn render(&mut self);

    /// Stößt das asynchrone Laden des CAD-Modells an.
    fn start_cad_load(&mut self, model: &ModelConfig) -> anyhow::Result<()>;

    /// Fragt den Ladefortschritt ab; `Ready` liefert das Modell per Besitz.
    fn poll_cad_load(&mut self) -> CadLoadStatus;

    /// Gibt alle Ressourcen der Szene frei.
    fn dispose(&mut self);
}

/// Geladenes Gelenkmodell. Alle Koordinaten sind Modell-lokal;
/// die Welt-Umrechnung übernimmt der Aufrufer.
pub trait ArticulatedModel {
    fn has_joint(&self, name: &str) -> bool;

    fn joint_angle(&self, name: &str) -> Option<f32>;

    /// Setzt den Gelenkwinkel; unbekannte Namen werden ignoriert.
    fn set_joint_angle(&mut self, name: &str, angle: f32);

    /// Gelenklimits in Radiant, falls das Modell welche deklariert.
    fn joint_limits(&self, name: &str) -> Option<[f32; 2]>;

    /// Ursprung des Gelenks nach aktueller Pose.
    fn joint_origin(&self, name: &str) -> Option<Vec3>;

    /// Momentane Drehachse des Gelenks nach aktueller Pose.
    fn joint_axis(&self, name: &str) -> Option<Vec3>;

    /// Position eines benannten Link-Frames nach aktueller Pose.
    fn link_position(&self, name: &str) -> Option<Vec3>;

    /// Wurzel-Transform des Modells in der Szene.
    fn set_root_transform(&mut self, transform: Transform);
}

/// Von der Umgebung gemeldete Fähigkeiten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCapabilities {
    /// GPU-Kontext verfügbar
    pub gpu: bool,
    /// CAD-Asset-Loader verfügbar
    pub cad_loader: bool,
}

/// Art der anzulegenden Engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererKind {
    Gpu,
    Software,
}

/// Host-Umgebung: Fähigkeitserkennung, Viewport und Engine-Fabrik.
pub trait HostEnv {
    /// Fähigkeiten abfragen; `None`, solange die Erkennung noch läuft.
    fn poll_capabilities(&mut self) -> Option<HostCapabilities>;

    /// Systemeinstellung für reduzierte Bewegung.
    fn prefers_reduced_motion(&self) -> bool;

    /// Aktuelle Viewport-Breite in CSS-Pixeln.
    fn viewport_width(&self) -> f32;

    /// Seitenverhältnis des Hero-Elements.
    fn hero_aspect(&self) -> f32;

    /// Legt eine Engine der gewünschten Art an.
    fn create_engine(&mut self, kind: RendererKind) -> anyhow::Result<Box<dyn SceneEngine>>;

    /// Zeigt das statische Fallback-Bild an.
    fn show_static_fallback(&mut self);
}
