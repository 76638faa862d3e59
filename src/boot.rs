//! Boot-Orchestrierung: Fähigkeitserkennung mit begrenztem Retry,
//! Umgebungs-Gates, Besitz der einzigen Render-Session und
//! Ereignisverteilung.

use crate::config::{parse_hero_config, HeroConfig};
use crate::diag::WarnSink;
use crate::render::engine::{HostEnv, RendererKind};
use crate::session::{RenderSession, SessionStatus};

/// Maximale Anzahl erfolgloser Fähigkeits-Polls, bevor auf das statische
/// Fallback umgeschaltet wird.
pub const MAX_BOOT_RETRIES: u32 = 40;

/// Abstand zwischen zwei Fähigkeits-Polls.
pub const BOOT_RETRY_INTERVAL_MS: f64 = 120.0;

/// Unterdrückungsfenster für Pointer-Ereignisse nach einem Einschalt-Toggle.
pub const POINTER_SUPPRESSION_MS: f64 = 260.0;

/// Sichtbarer Zustand des Heros.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeroPhase {
    /// Statisches Fallback-Bild, keine Session.
    Static,
    /// Fähigkeiten werden geprüft oder das Backend lädt.
    Loading,
    /// Die Session animiert.
    Active,
}

/// Von außen eingespeiste Ereignisse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeroEvent {
    PointerMoved {
        ndc_x: f32,
        ndc_y: f32,
        inside_hero: bool,
    },
    PointerLeftHero,
    WindowBlurred,
    Resized { aspect: f32 },
    VisibilityChanged { visible: bool },
    ToggleChanged { enabled: bool },
}

/// Besitzt Host, Konfiguration und die höchstens eine Render-Session.
pub struct BootOrchestrator {
    config: HeroConfig,
    host: Box<dyn HostEnv>,
    phase: HeroPhase,
    session: Option<RenderSession>,
    warn: WarnSink,
    attempts: u32,
    next_retry_at: Option<f64>,
    boot_in_progress: bool,
    enabled: bool,
    suppress_on_mount: bool,
}

impl BootOrchestrator {
    /// Parst die eingebettete Konfiguration und legt den Orchestrator im
    /// statischen Zustand an. Fehlende wie unlesbare Konfiguration zählt
    /// als nicht eingeschaltet: der Hero bleibt statisch, bis ein
    /// explizites Einschalt-Ereignis kommt.
    pub fn new(host: Box<dyn HostEnv>, config_json: Option<&str>) -> Self {
        let mut warn = WarnSink::new();
        let (mut config, enabled) = match config_json {
            Some(json) => match parse_hero_config(json) {
                Ok(config) => {
                    let enabled = config.enabled;
                    (config, enabled)
                }
                Err(error) => {
                    warn.warn_once_with_error(
                        "config-invalid",
                        "Hero-Konfiguration unlesbar, statisches Fallback",
                        &error,
                    );
                    (HeroConfig::default(), false)
                }
            },
            None => (HeroConfig::default(), false),
        };
        config.normalize();

        Self {
            config,
            host,
            phase: HeroPhase::Static,
            session: None,
            warn,
            attempts: 0,
            next_retry_at: None,
            boot_in_progress: false,
            enabled,
            suppress_on_mount: false,
        }
    }

    pub fn phase(&self) -> HeroPhase {
        self.phase
    }

    pub fn session(&self) -> Option<&RenderSession> {
        self.session.as_ref()
    }

    pub fn warnings(&self) -> &WarnSink {
        &self.warn
    }

    // ── Boot-Ablauf ─────────────────────────────────────────────────

    /// Startet den Boot-Vorgang. Läuft bereits eine Session oder ein
    /// Boot, ist der Aufruf ein No-op (Singleton-Garantie).
    pub fn start(&mut self, now_ms: f64) {
        if self.session.is_some() || self.boot_in_progress {
            self.suppress_on_mount = false;
            self.warn
                .warn_once("boot-duplicate", "Boot übersprungen: Hero läuft bereits");
            return;
        }
        if !self.enabled {
            self.suppress_on_mount = false;
            self.go_static();
            return;
        }

        // Die Umgebungs-Gates greifen vor dem ersten Fähigkeits-Poll; ein
        // gegateter Host sieht daher nie eine Fähigkeits-Warnung.
        let gated = self.host.prefers_reduced_motion()
            || self.host.viewport_width() < self.config.desktop_min_width;
        if gated && !self.config.force_interactive {
            self.suppress_on_mount = false;
            self.go_static();
            return;
        }

        self.boot_in_progress = true;
        self.attempts = 0;
        self.phase = HeroPhase::Loading;
        self.try_mount(now_ms);
    }

    /// Treibt Retry-Fenster und Session-Frames voran.
    pub fn tick(&mut self, now_ms: f64) {
        if let Some(retry_at) = self.next_retry_at {
            if now_ms >= retry_at {
                self.next_retry_at = None;
                self.try_mount(now_ms);
            }
        }

        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.tick(now_ms) {
            SessionStatus::Active => self.phase = HeroPhase::Active,
            SessionStatus::Loading => self.phase = HeroPhase::Loading,
            SessionStatus::Failed => {
                self.warn.warn_once(
                    "session-failed",
                    "Render-Backend endgültig fehlgeschlagen, statisches Fallback",
                );
                self.dispose_session();
                self.go_static();
            }
            SessionStatus::Disposed => {}
        }
    }

    /// Verteilt ein Ereignis an Session und Lebenszyklus.
    pub fn handle_event(&mut self, now_ms: f64, event: HeroEvent) {
        match event {
            HeroEvent::PointerMoved {
                ndc_x,
                ndc_y,
                inside_hero,
            } => {
                if let Some(session) = self.session.as_mut() {
                    session.pointer_moved(now_ms, ndc_x, ndc_y, inside_hero);
                }
            }
            HeroEvent::PointerLeftHero => {
                if let Some(session) = self.session.as_mut() {
                    session.pointer_left_hero();
                }
            }
            HeroEvent::WindowBlurred => {
                if let Some(session) = self.session.as_mut() {
                    session.clear_pointer();
                }
            }
            HeroEvent::Resized { aspect } => {
                if let Some(session) = self.session.as_mut() {
                    session.handle_resize(aspect);
                }
            }
            HeroEvent::VisibilityChanged { visible } => {
                // Beim Verstecken wird nur die Session abgebaut; der
                // gewünschte Zustand bleibt erhalten. Neu gebootet wird
                // erst durch ein explizites Einschalt-Ereignis.
                if !visible {
                    self.cancel_boot();
                    self.dispose_session();
                    self.phase = HeroPhase::Static;
                }
            }
            HeroEvent::ToggleChanged { enabled } => {
                self.enabled = enabled;
                if enabled {
                    // Läuft bereits eine Session, greift das Fenster direkt
                    // auf ihr; sonst beim nächsten Mount.
                    if let Some(session) = self.session.as_mut() {
                        session.suppress_pointer(now_ms, POINTER_SUPPRESSION_MS);
                    } else {
                        self.suppress_on_mount = true;
                        self.cancel_boot();
                        self.start(now_ms);
                    }
                } else {
                    self.cancel_boot();
                    self.dispose_session();
                    self.go_static();
                }
            }
        }
    }

    // ── intern ──────────────────────────────────────────────────────

    fn try_mount(&mut self, now_ms: f64) {
        let Some(caps) = self.host.poll_capabilities() else {
            self.attempts += 1;
            if self.attempts > MAX_BOOT_RETRIES {
                self.warn.warn_once(
                    "capability-timeout",
                    "Fähigkeitserkennung nicht abgeschlossen, statisches Fallback",
                );
                self.boot_in_progress = false;
                self.go_static();
            } else {
                self.next_retry_at = Some(now_ms + BOOT_RETRY_INTERVAL_MS);
            }
            return;
        };

        let kind = if caps.gpu {
            RendererKind::Gpu
        } else if self.config.debug_allow_software_fallback {
            self.warn.warn_once(
                "gpu-missing-software",
                "Kein GPU-Kontext, Software-Renderer wird verwendet",
            );
            RendererKind::Software
        } else {
            self.warn
                .warn_once("gpu-missing", "Kein GPU-Kontext, statisches Fallback");
            self.boot_in_progress = false;
            self.go_static();
            return;
        };

        let mut config = self.config.clone();
        if config.model.use_cad && !caps.cad_loader {
            if config.debug_allow_primitive_fallback {
                self.warn.warn_once(
                    "cad-loader-missing-primitive",
                    "Kein CAD-Loader, Primitiv-Rig wird verwendet",
                );
                config.model.use_cad = false;
            } else {
                self.warn.warn_once(
                    "cad-loader-missing",
                    "Kein CAD-Loader verfügbar, statisches Fallback",
                );
                self.boot_in_progress = false;
                self.go_static();
                return;
            }
        }

        let engine = match self.host.create_engine(kind) {
            Ok(engine) => engine,
            Err(error) => {
                self.warn.warn_once_with_error(
                    "engine-create-failed",
                    "Engine konnte nicht angelegt werden",
                    &error,
                );
                self.boot_in_progress = false;
                self.go_static();
                return;
            }
        };

        let aspect = self.host.hero_aspect();
        match RenderSession::new(engine, config, aspect, now_ms) {
            Ok(mut session) => {
                if self.suppress_on_mount {
                    session.suppress_pointer(now_ms, POINTER_SUPPRESSION_MS);
                    self.suppress_on_mount = false;
                }
                self.session = Some(session);
                self.phase = HeroPhase::Loading;
                self.boot_in_progress = false;
            }
            Err(error) => {
                self.warn.warn_once_with_error(
                    "session-create-failed",
                    "Render-Session konnte nicht aufgebaut werden",
                    &error,
                );
                self.boot_in_progress = false;
                self.go_static();
            }
        }
    }

    fn cancel_boot(&mut self) {
        self.boot_in_progress = false;
        self.next_retry_at = None;
        self.attempts = 0;
    }

    fn dispose_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.dispose();
        }
    }

    fn go_static(&mut self) {
        self.phase = HeroPhase::Static;
        self.host.show_static_fallback();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::engine::{HostCapabilities, SceneEngine};

    struct NullHost;

    impl HostEnv for NullHost {
        fn poll_capabilities(&mut self) -> Option<HostCapabilities> {
            None
        }
        fn prefers_reduced_motion(&self) -> bool {
            false
        }
        fn viewport_width(&self) -> f32 {
            1920.0
        }
        fn hero_aspect(&self) -> f32 {
            16.0 / 9.0
        }
        fn create_engine(&mut self, _kind: RendererKind) -> anyhow::Result<Box<dyn SceneEngine>> {
            anyhow::bail!("keine Engine im Test-Host")
        }
        fn show_static_fallback(&mut self) {}
    }

    #[test]
    fn test_invalid_config_goes_static_without_boot() {
        let mut boot = BootOrchestrator::new(Box::new(NullHost), Some("{nicht json"));
        assert!(boot.warnings().has_warned("config-invalid"));
        // Die Defaults bleiben als Konfigurationsbasis erhalten, gebootet
        // wird damit aber nicht.
        assert_eq!(boot.config.arm_lengths, crate::config::ARM_LENGTHS_DEFAULT);

        boot.start(0.0);
        assert_eq!(boot.phase(), HeroPhase::Static);
    }

    #[test]
    fn test_missing_config_stays_static() {
        let mut boot = BootOrchestrator::new(Box::new(NullHost), None);
        assert!(boot.warnings().is_empty());
        boot.start(0.0);
        assert_eq!(boot.phase(), HeroPhase::Static);
    }
}
