//! Pointer-Zustand und Auflösung des 3D-Zielpunkts.
//!
//! Der Tracker hält den letzten Pointer-Schnappschuss (inklusive
//! Unterdrückungsfenster nach einem Sichtbarkeits-Toggle); der Resolver
//! mischt daraus und aus der Idle-Kurve den geglätteten Zielpunkt.

use glam::Vec3;

use crate::config::{
    HeroConfig, InteractionScope, PointerPlaneMode, WorkspaceConfig, POINTER_BOX_X, POINTER_BOX_Y,
    POINTER_BOX_Z,
};
use crate::core::camera::HeroCamera;

/// Letzter bekannter Pointer-Zustand in NDC.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    pub ndc_x: f32,
    pub ndc_y: f32,
    /// Pointer liegt innerhalb des Hero-Elements
    pub inside_hero: bool,
    /// Seit dem letzten Reset kam mindestens ein Pointer-Ereignis an
    pub active: bool,
}

/// Sammelt Pointer-Ereignisse ein und hält ein Unterdrückungsfenster.
#[derive(Debug, Default)]
pub struct PointerTracker {
    state: PointerState,
    suppressed_until_ms: f64,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Verwirft Pointer-Ereignisse bis `now_ms + duration_ms` und löscht
    /// den aktuellen Zustand.
    pub fn suppress_for(&mut self, now_ms: f64, duration_ms: f64) {
        self.suppressed_until_ms = now_ms + duration_ms;
        self.state = PointerState::default();
    }

    pub fn is_suppressed(&self, now_ms: f64) -> bool {
        now_ms < self.suppressed_until_ms
    }

    /// Übernimmt eine Pointer-Bewegung (oder einen Pointer-Down).
    pub fn pointer_moved(&mut self, now_ms: f64, ndc_x: f32, ndc_y: f32, inside_hero: bool) {
        if self.is_suppressed(now_ms) {
            self.state = PointerState::default();
            return;
        }
        self.state = PointerState {
            ndc_x,
            ndc_y,
            inside_hero,
            active: true,
        };
    }

    /// Pointer hat das Hero-Element verlassen.
    pub fn pointer_left_hero(&mut self) {
        self.state.inside_hero = false;
    }

    /// Fenster-Blur oder Sichtbarkeitswechsel: Zustand komplett löschen.
    pub fn clear(&mut self) {
        self.state = PointerState::default();
    }

    pub fn state(&self) -> PointerState {
        self.state
    }
}

/// Idle-Kurve: geschlossene Schleife vor der Basis.
pub fn idle_target(base: Vec3, elapsed_s: f32) -> Vec3 {
    base + Vec3::new(
        0.35 + (elapsed_s * 0.54).cos() * 0.78,
        1.0 + (elapsed_s * 0.64).sin() * 0.4,
        (elapsed_s * 0.46).sin() * 0.72,
    )
}

fn lerp_range(range: [f32; 2], t: f32) -> f32 {
    range[0] + (range[1] - range[0]) * t
}

fn axis_range(min: Option<f32>, max: Option<f32>, fallback: [f32; 2]) -> [f32; 2] {
    [min.unwrap_or(fallback[0]), max.unwrap_or(fallback[1])]
}

/// Direktes NDC→Workspace-Box-Mapping (`workspace`-Planenmodus).
///
/// Gelerpt wird über die konfigurierten Workspace-Grenzen; unkonfigurierte
/// Achsen fallen auf die `POINTER_BOX_*`-Konstanten zurück. Ohne feste
/// Z-Ebene wandert die Tiefe mit der X-Achse von hinten nach vorn, damit
/// seitliche Bewegungen den Arm um die Säule führen.
pub fn map_pointer_to_workspace(
    ndc_x: f32,
    ndc_y: f32,
    plane_z: Option<f32>,
    workspace: &WorkspaceConfig,
) -> Vec3 {
    let x_range = axis_range(workspace.min_x, workspace.max_x, POINTER_BOX_X);
    let y_range = axis_range(workspace.min_y, workspace.max_y, POINTER_BOX_Y);
    let z_range = axis_range(workspace.min_z, workspace.max_z, POINTER_BOX_Z);

    let tx = ((ndc_x + 1.0) * 0.5).clamp(0.0, 1.0);
    let ty = ((ndc_y + 1.0) * 0.5).clamp(0.0, 1.0);
    let z = match plane_z {
        Some(z) => z.clamp(z_range[0], z_range[1]),
        None => lerp_range([z_range[1], z_range[0]], tx),
    };
    Vec3::new(lerp_range(x_range, tx), lerp_range(y_range, ty), z)
}

/// Projiziert den Pointer gemäß Planenmodus in die Welt.
pub fn pointer_world_target(
    config: &HeroConfig,
    camera: &HeroCamera,
    pointer: PointerState,
) -> Vec3 {
    let interaction = &config.interaction;
    match interaction.pointer_plane_mode {
        PointerPlaneMode::Workspace => map_pointer_to_workspace(
            pointer.ndc_x,
            pointer.ndc_y,
            interaction.mouse_plane_z,
            &config.workspace,
        ),
        PointerPlaneMode::WorldZ => {
            let z = interaction.mouse_plane_z.unwrap_or(0.0);
            camera.intersect_plane(pointer.ndc_x, pointer.ndc_y, Vec3::new(0.0, 0.0, z), Vec3::Z)
        }
        PointerPlaneMode::Camera => {
            let view = camera.view_direction();
            let anchor = camera.look_at + view * interaction.pointer_plane_offset;
            camera.intersect_plane(pointer.ndc_x, pointer.ndc_y, anchor, view)
        }
    }
}

/// Glättet den Zielpunkt Richtung Wunschziel.
#[derive(Debug, Clone)]
pub struct TargetResolver {
    current: Vec3,
    started_ms: f64,
}

impl TargetResolver {
    pub fn new(initial: Vec3, started_ms: f64) -> Self {
        Self {
            current: initial,
            started_ms,
        }
    }

    pub fn current(&self) -> Vec3 {
        self.current
    }

    /// Setzt den Zielpunkt ohne Glättung.
    pub fn snap(&mut self, target: Vec3) {
        self.current = target;
    }

    /// Wunschziel und Glättungsfaktor für den aktuellen Frame.
    ///
    /// `hero`: Pointer zählt nur im Hero-Element. `viewport`: Pointer zählt
    /// überall voll. `hybrid`: volles Gewicht im Hero, außerhalb wird mit
    /// `global_weight` Richtung Idle-Kurve gemischt und die Glättung mit
    /// `global_idle_damping` verlangsamt.
    pub fn desired(
        &self,
        config: &HeroConfig,
        camera: &HeroCamera,
        pointer: PointerState,
        base: Vec3,
        now_ms: f64,
    ) -> (Vec3, f32) {
        let elapsed_s = ((now_ms - self.started_ms) / 1000.0) as f32;
        let idle = idle_target(base, elapsed_s);
        let alpha = config.ik.target_smoothing;
        if !pointer.active {
            return (idle, alpha);
        }

        let interaction = &config.interaction;
        let world = pointer_world_target(config, camera, pointer);
        match interaction.scope {
            InteractionScope::Hero => {
                if pointer.inside_hero {
                    (idle.lerp(world, interaction.hero_weight), alpha)
                } else {
                    (idle, alpha)
                }
            }
            InteractionScope::Viewport => (world, alpha),
            InteractionScope::Hybrid => {
                if pointer.inside_hero {
                    (idle.lerp(world, interaction.hero_weight), alpha)
                } else {
                    (
                        idle.lerp(world, interaction.global_weight),
                        alpha * interaction.global_idle_damping,
                    )
                }
            }
        }
    }

    /// Führt einen Glättungsschritt aus und liefert den neuen Zielpunkt.
    pub fn resolve(
        &mut self,
        config: &HeroConfig,
        camera: &HeroCamera,
        pointer: PointerState,
        base: Vec3,
        now_ms: f64,
    ) -> Vec3 {
        let (desired, alpha) = self.desired(config, camera, pointer, base, now_ms);
        self.current += (desired - self.current) * alpha;
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use approx::assert_relative_eq;

    fn test_camera() -> HeroCamera {
        HeroCamera::from_config(&CameraConfig::default(), 16.0 / 9.0)
    }

    fn pointer_at(ndc_x: f32, ndc_y: f32, inside_hero: bool) -> PointerState {
        PointerState {
            ndc_x,
            ndc_y,
            inside_hero,
            active: true,
        }
    }

    #[test]
    fn test_idle_target_at_start() {
        let idle = idle_target(Vec3::ZERO, 0.0);
        assert_relative_eq!(idle.x, 1.13);
        assert_relative_eq!(idle.y, 1.0);
        assert_relative_eq!(idle.z, 0.0);
    }

    #[test]
    fn test_pointer_events_are_dropped_while_suppressed() {
        let mut tracker = PointerTracker::new();
        tracker.suppress_for(1000.0, 260.0);

        tracker.pointer_moved(1100.0, 0.2, 0.3, true);
        assert!(!tracker.state().active);

        tracker.pointer_moved(1300.0, 0.2, 0.3, true);
        assert!(tracker.state().active);
        assert!(tracker.state().inside_hero);
    }

    #[test]
    fn test_suppression_clears_previous_state() {
        let mut tracker = PointerTracker::new();
        tracker.pointer_moved(0.0, 0.5, 0.5, true);
        tracker.suppress_for(10.0, 260.0);
        assert_eq!(tracker.state(), PointerState::default());
    }

    #[test]
    fn test_workspace_mapping_center() {
        let center = map_pointer_to_workspace(0.0, 0.0, None, &WorkspaceConfig::default());
        assert_relative_eq!(center.x, 0.0);
        assert_relative_eq!(center.y, 1.3);
        assert_relative_eq!(center.z, 0.0);
    }

    #[test]
    fn test_workspace_mapping_clamps_fixed_plane() {
        let mapped = map_pointer_to_workspace(0.0, 0.0, Some(9.0), &WorkspaceConfig::default());
        assert_relative_eq!(mapped.z, 2.0);
    }

    #[test]
    fn test_workspace_mapping_uses_configured_bounds() {
        let workspace = WorkspaceConfig {
            min_x: Some(-1.0),
            max_x: Some(1.0),
            min_y: Some(0.5),
            max_y: Some(1.5),
            ..Default::default()
        };
        let corner = map_pointer_to_workspace(1.0, 1.0, None, &workspace);
        assert_relative_eq!(corner.x, 1.0);
        assert_relative_eq!(corner.y, 1.5);
        // Z bleibt unkonfiguriert und fällt auf die Konstanten zurück.
        assert_relative_eq!(corner.z, -2.0);
    }

    #[test]
    fn test_hero_scope_ignores_pointer_outside_hero() {
        let config = HeroConfig::default();
        let camera = test_camera();
        let resolver = TargetResolver::new(Vec3::ZERO, 0.0);

        let (outside, _) =
            resolver.desired(&config, &camera, pointer_at(0.8, 0.1, false), Vec3::ZERO, 0.0);
        let (no_pointer, _) =
            resolver.desired(&config, &camera, PointerState::default(), Vec3::ZERO, 0.0);
        assert_eq!(outside, no_pointer);
    }

    #[test]
    fn test_viewport_scope_follows_pointer_everywhere() {
        let mut config = HeroConfig::default();
        config.interaction.scope = InteractionScope::Viewport;
        let camera = test_camera();
        let resolver = TargetResolver::new(Vec3::ZERO, 0.0);

        let pointer = pointer_at(0.8, 0.1, false);
        let (desired, _) = resolver.desired(&config, &camera, pointer, Vec3::ZERO, 0.0);
        let world = pointer_world_target(&config, &camera, pointer);
        assert_eq!(desired, world);
    }

    #[test]
    fn test_hybrid_scope_dampens_outside_hero() {
        let mut config = HeroConfig::default();
        config.interaction.scope = InteractionScope::Hybrid;
        let camera = test_camera();
        let resolver = TargetResolver::new(Vec3::ZERO, 0.0);

        let (_, inside_alpha) =
            resolver.desired(&config, &camera, pointer_at(0.2, 0.2, true), Vec3::ZERO, 0.0);
        let (outside, outside_alpha) =
            resolver.desired(&config, &camera, pointer_at(0.2, 0.2, false), Vec3::ZERO, 0.0);

        assert!(outside_alpha < inside_alpha);

        let idle = idle_target(Vec3::ZERO, 0.0);
        let world = pointer_world_target(&config, &camera, pointer_at(0.2, 0.2, false));
        let expected = idle.lerp(world, config.interaction.global_weight);
        assert_relative_eq!(outside.x, expected.x, epsilon = 1e-5);
        assert_relative_eq!(outside.y, expected.y, epsilon = 1e-5);
    }

    #[test]
    fn test_resolver_converges_to_static_target() {
        let mut config = HeroConfig::default();
        config.interaction.scope = InteractionScope::Viewport;
        config.interaction.pointer_plane_mode = PointerPlaneMode::Workspace;
        let camera = test_camera();
        let mut resolver = TargetResolver::new(Vec3::ZERO, 0.0);

        let pointer = pointer_at(0.0, 0.0, false);
        let world = pointer_world_target(&config, &camera, pointer);
        for _ in 0..200 {
            resolver.resolve(&config, &camera, pointer, Vec3::ZERO, 0.0);
        }
        assert!((resolver.current() - world).length() < 1e-3);
    }
}
