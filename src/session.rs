//! Laufende Render-Session: Frame-Pipeline vom Pointer-Zustand bis zur
//! gestellten Szene, Status-Poll des CAD-Ladevorgangs und Aufräumen.

use glam::Vec3;

use crate::config::{HeroConfig, IkMode};
use crate::core::camera::HeroCamera;
use crate::core::chain::KinematicChain;
use crate::core::fk::forward_kinematics;
use crate::core::ik::{solve_dls_ik, solve_so_position_ik, DlsParams};
use crate::core::target::{PointerState, PointerTracker, TargetResolver};
use crate::core::workspace::clamp_target;
use crate::diag::WarnSink;
use crate::render::backend::{BackendProxy, LoadState, VisualBackend};
use crate::render::engine::SceneEngine;
use crate::render::primitive::PrimitiveRig;

/// Abstand zwischen zwei Abfragen des CAD-Ladezustands.
pub const STATUS_POLL_INTERVAL_MS: f64 = 120.0;

/// Startziel, bis Pointer oder Idle-Kurve übernehmen.
pub const INITIAL_TARGET: [f32; 3] = [0.45, 1.08, 0.0];

/// Zustand der Session aus Sicht des Orchestrators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Backend lädt noch (nur CAD).
    Loading,
    /// Szene wird animiert.
    Active,
    /// Backend endgültig fehlgeschlagen; die Session ist abzubauen.
    Failed,
    /// Session wurde bereits entsorgt.
    Disposed,
}

/// Besitzt Engine, Kette und Backend für die Dauer einer Hero-Anzeige.
pub struct RenderSession {
    config: HeroConfig,
    engine: Box<dyn SceneEngine>,
    camera: HeroCamera,
    chain: KinematicChain,
    tracker: PointerTracker,
    resolver: TargetResolver,
    proxy: BackendProxy,
    warn: WarnSink,
    last_poll_ms: f64,
    disposed: bool,
}

impl RenderSession {
    /// Baut die Session auf: Kamera, Kette, Backend.
    ///
    /// Beim CAD-Backend wird der Ladevorgang sofort angestoßen; das
    /// Primitiv-Rig steht dagegen ab dem ersten Frame bereit.
    pub fn new(
        mut engine: Box<dyn SceneEngine>,
        config: HeroConfig,
        aspect: f32,
        now_ms: f64,
    ) -> anyhow::Result<Self> {
        let camera = HeroCamera::from_config(&config.camera, aspect);
        let chain = KinematicChain::from_config(&config);
        let resolver = TargetResolver::new(Vec3::from_array(INITIAL_TARGET), now_ms);

        let proxy = if config.model.use_cad {
            engine.start_cad_load(&config.model)?;
            // Debug-Option: Primitiv-Rig überbrückt die CAD-Ladezeit.
            let interim = config
                .debug_allow_primitive_fallback
                .then(|| PrimitiveRig::build(engine.as_mut(), &config));
            BackendProxy::pending_cad(interim)
        } else {
            let rig = PrimitiveRig::build(engine.as_mut(), &config);
            BackendProxy::ready_primitive(rig)
        };

        Ok(Self {
            config,
            engine,
            camera,
            chain,
            tracker: PointerTracker::new(),
            resolver,
            proxy,
            warn: WarnSink::new(),
            last_poll_ms: now_ms - STATUS_POLL_INTERVAL_MS,
            disposed: false,
        })
    }

    // ── Pointer-Weiterleitung ───────────────────────────────────────

    pub fn pointer_moved(&mut self, now_ms: f64, ndc_x: f32, ndc_y: f32, inside_hero: bool) {
        self.tracker.pointer_moved(now_ms, ndc_x, ndc_y, inside_hero);
    }

    pub fn pointer_left_hero(&mut self) {
        self.tracker.pointer_left_hero();
    }

    pub fn clear_pointer(&mut self) {
        self.tracker.clear();
    }

    pub fn suppress_pointer(&mut self, now_ms: f64, duration_ms: f64) {
        self.tracker.suppress_for(now_ms, duration_ms);
    }

    pub fn pointer_state(&self) -> PointerState {
        self.tracker.state()
    }

    /// Zuletzt aufgelöster (ungeklemmter) Zielpunkt.
    pub fn current_target(&self) -> Vec3 {
        self.resolver.current()
    }

    // ── Frame-Pipeline ──────────────────────────────────────────────

    /// Ein Animations-Frame: Ladezustand pollen, Ziel auflösen, IK lösen,
    /// Szene stellen.
    pub fn tick(&mut self, now_ms: f64) -> SessionStatus {
        if self.disposed {
            return SessionStatus::Disposed;
        }

        if self.proxy.state() == LoadState::Pending
            && now_ms - self.last_poll_ms >= STATUS_POLL_INTERVAL_MS
        {
            self.last_poll_ms = now_ms;
            self.proxy
                .poll(self.engine.as_mut(), &self.config.model, &mut self.warn);
        }
        if self.proxy.state() == LoadState::Failed {
            return SessionStatus::Failed;
        }
        let loading = self.proxy.state() != LoadState::Ready;

        let pointer = self.tracker.state();
        // Direkte URDF-IK folgt dem Ziel ungefiltert, alle anderen Pfade
        // glätten exponentiell.
        let direct_urdf = self.proxy.is_ready()
            && self.config.model.use_cad
            && self.config.model.ik_mode == IkMode::Urdf;
        let resolved = if direct_urdf {
            let (desired, _) =
                self.resolver
                    .desired(&self.config, &self.camera, pointer, self.chain.base, now_ms);
            self.resolver.snap(desired);
            desired
        } else {
            self.resolver
                .resolve(&self.config, &self.camera, pointer, self.chain.base, now_ms)
        };
        let mut target = resolved;
        if self.config.ik.clamp_workspace {
            target = clamp_target(target, &self.config.workspace, self.chain.base);
        }

        let ik = &self.config.ik;
        // Ohne Backend (CAD lädt noch, kein Zwischen-Rig) gibt es nichts zu stellen.
        let Some(backend) = self.proxy.backend_mut() else {
            return SessionStatus::Loading;
        };
        match backend {
            VisualBackend::Primitive(rig) => {
                let desired = solve_so_position_ik(&self.chain, target, ik);
                self.chain.smooth_towards(&desired, ik.joint_smoothing);
                if ik.refine_iterations > 0 {
                    solve_dls_ik(&mut self.chain, target, &DlsParams::frame_refine(ik));
                }
                let fk = forward_kinematics(&self.chain);
                rig.pose_from_fk(self.engine.as_mut(), &fk, target);
            }
            VisualBackend::Cad(visual) => {
                match visual.ik_mode() {
                    IkMode::Urdf => {
                        visual.solve_urdf_position_ik(target, ik, &mut self.warn);
                    }
                    IkMode::Analytic => {
                        let desired = solve_so_position_ik(&self.chain, target, ik);
                        self.chain.smooth_towards(&desired, ik.joint_smoothing);
                        visual.apply_mapped_angles(self.chain.angles);
                    }
                }
                // Der Greifer misst gegen das ungeklemmte Ziel, sonst
                // schließt er an den Workspace-Rändern zu früh.
                if let Some(effector) = visual.effector_world() {
                    let distance = (effector - resolved).length();
                    visual.update_gripper_from_proximity(
                        distance,
                        &self.config.gripper,
                        &mut self.warn,
                    );
                }
            }
        }
        self.engine.render();

        if loading {
            SessionStatus::Loading
        } else {
            SessionStatus::Active
        }
    }

    /// Übernimmt ein neues Seitenverhältnis nach einem Resize.
    pub fn handle_resize(&mut self, aspect: f32) {
        self.camera = HeroCamera::from_config(&self.config.camera, aspect);
    }

    /// Gibt die Engine-Ressourcen frei. Wiederholte Aufrufe sind No-ops.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.engine.dispose();
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn warnings(&self) -> &WarnSink {
        &self.warn
    }
}
