//! Backend-Auswahl und Lade-Proxy.
//!
//! Der Proxy kapselt den asynchronen CAD-Ladevorgang hinter einem expliziten
//! Zustandsautomaten: genau ein Übergang von `Pending` nach `Ready` oder
//! `Failed`, danach ist der Zustand final. Nicht-CAD-Backends sind sofort
//! `Ready`.

use crate::config::ModelConfig;
use crate::diag::WarnSink;
use crate::render::cad::CadVisual;
use crate::render::engine::{CadLoadStatus, SceneEngine};
use crate::render::primitive::PrimitiveRig;

/// Aktive Darstellung des Arms.
pub enum VisualBackend {
    Primitive(PrimitiveRig),
    Cad(CadVisual),
}

/// Ladezustand des Backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Pending,
    Ready,
    Failed,
}

/// Hält das Backend und seinen Ladezustand zusammen.
pub struct BackendProxy {
    state: LoadState,
    backend: Option<VisualBackend>,
}

impl BackendProxy {
    /// Primitiv-Backend: sofort einsatzbereit.
    pub fn ready_primitive(rig: PrimitiveRig) -> Self {
        Self {
            state: LoadState::Ready,
            backend: Some(VisualBackend::Primitive(rig)),
        }
    }

    /// CAD-Backend, dessen Asset noch geladen wird. Optional überbrückt ein
    /// Primitiv-Rig die Ladezeit; es wird beim Upgrade entsorgt.
    pub fn pending_cad(interim: Option<PrimitiveRig>) -> Self {
        Self {
            state: LoadState::Pending,
            backend: interim.map(VisualBackend::Primitive),
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == LoadState::Ready
    }

    pub fn backend_mut(&mut self) -> Option<&mut VisualBackend> {
        self.backend.as_mut()
    }

    /// Fragt den Ladefortschritt ab und vollzieht höchstens einen
    /// Zustandsübergang. Nach `Ready` oder `Failed` ist der Aufruf ein No-op.
    pub fn poll(
        &mut self,
        engine: &mut dyn SceneEngine,
        model_config: &ModelConfig,
        warn: &mut WarnSink,
    ) -> LoadState {
        if self.state != LoadState::Pending {
            return self.state;
        }
        match engine.poll_cad_load() {
            CadLoadStatus::Pending => {}
            CadLoadStatus::Ready(model) => {
                if let Some(VisualBackend::Primitive(rig)) = self.backend.take() {
                    rig.dispose(engine);
                }
                self.backend = Some(VisualBackend::Cad(CadVisual::new(
                    model,
                    model_config,
                    warn,
                )));
                self.state = LoadState::Ready;
            }
            CadLoadStatus::Failed(error) => {
                warn.warn_once_with_error(
                    "cad-load-failed",
                    "CAD-Modell konnte nicht geladen werden",
                    &error,
                );
                self.state = LoadState::Failed;
            }
        }
        self.state
    }
}
