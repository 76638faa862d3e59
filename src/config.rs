//! Zentrale Konfiguration für die SO-101 Hero-Animation.
//!
//! `HeroConfig` wird einmalig aus dem eingebetteten JSON-Block geparst.
//! Die `const`-Werte bleiben als Fallback/Default erhalten; `normalize()`
//! löst alle abgeleiteten Defaults genau einmal beim Boot auf.

use serde::Deserialize;

// ── Kinematik ───────────────────────────────────────────────────────

/// Standard-Link-Längen (Schulter, Ellbogen, Handgelenk) in Welteinheiten.
pub const ARM_LENGTHS_DEFAULT: [f32; 3] = [0.72, 0.63, 0.5];
/// Standard-Startwinkel (Yaw, Schulter, Ellbogen, Handgelenk) in Grad.
pub const INITIAL_ANGLES_DEG_DEFAULT: [f32; 4] = [12.0, 38.0, -52.0, 18.0];
/// Höhe der Basissäule bis zum Schultergelenk.
pub const BASE_HEIGHT_DEFAULT: f32 = 0.24;
/// Gelenklimits in Grad: Yaw.
pub const LIMIT_YAW_DEG: [f32; 2] = [-140.0, 140.0];
/// Gelenklimits in Grad: Schulter.
pub const LIMIT_SHOULDER_DEG: [f32; 2] = [-85.0, 95.0];
/// Gelenklimits in Grad: Ellbogen.
pub const LIMIT_ELBOW_DEG: [f32; 2] = [-140.0, 25.0];
/// Gelenklimits in Grad: Handgelenk.
pub const LIMIT_WRIST_DEG: [f32; 2] = [-120.0, 120.0];

/// Minimale Viewport-Breite für den interaktiven Modus.
pub const DESKTOP_MIN_WIDTH_DEFAULT: f32 = 768.0;

// ── IK-Solver ───────────────────────────────────────────────────────

/// Glättungsfaktor für das Ziel (exponentiell, pro Frame).
pub const TARGET_SMOOTHING_DEFAULT: f32 = 0.22;
/// Glättungsfaktor für die Gelenkwinkel (pro Frame).
pub const JOINT_SMOOTHING_DEFAULT: f32 = 0.24;
/// DLS-Iterationen der Seed-Verfeinerung.
pub const IK_ITERATIONS_DEFAULT: u32 = 48;
/// DLS-Dämpfung der Seed-Verfeinerung.
pub const IK_DAMPING_DEFAULT: f32 = 0.14;
/// Konvergenz-Epsilon (Positionsfehler in Welteinheiten).
pub const IK_EPSILON_DEFAULT: f32 = 0.005;
/// Maximaler Winkelschritt pro DLS-Iteration in Grad.
pub const IK_MAX_STEP_DEG_DEFAULT: f32 = 7.5;
/// Mischfaktor zwischen aktueller Pose und analytischem Seed.
pub const ANALYTIC_SEED_BLEND_DEFAULT: f32 = 0.68;
/// Werkzeug-Pitch des Endeffektors in Grad.
pub const TOOL_PITCH_DEG_DEFAULT: f32 = -8.0;
/// Minimaler Ellbogen-Betragswinkel (Guard) in Grad.
pub const ELBOW_MIN_ABS_DEG_DEFAULT: f32 = 18.0;
/// Iterationen des kurzen Refine-Passes nach dem Collision-Guard.
pub const POST_GUARD_REFINE_ITERATIONS_DEFAULT: u32 = 5;
/// Dämpfung des Post-Guard-Refine-Passes.
pub const POST_GUARD_REFINE_DAMPING: f32 = 0.18;
/// Maximaler Schritt des Post-Guard-Refine-Passes in Grad.
pub const POST_GUARD_REFINE_MAX_STEP_DEG: f32 = 3.0;
/// Dämpfung des optionalen Per-Frame-Refine auf der Live-Kette.
pub const FRAME_REFINE_DAMPING_DEFAULT: f32 = 0.16;
/// Maximaler Schritt des Per-Frame-Refine in Grad.
pub const FRAME_REFINE_MAX_STEP_DEG_DEFAULT: f32 = 4.0;
/// DLS-Parameter für die direkte IK auf den nativen CAD-Gelenken.
pub const URDF_ITERATIONS_DEFAULT: u32 = 32;
/// Dämpfung der nativen CAD-IK.
pub const URDF_DAMPING_DEFAULT: f32 = 0.14;
/// Epsilon der nativen CAD-IK.
pub const URDF_EPSILON_DEFAULT: f32 = 0.02;
/// Maximaler Schritt der nativen CAD-IK in Grad.
pub const URDF_MAX_STEP_DEG_DEFAULT: f32 = 8.0;

// ── Workspace-Fallbacks für Pointer-Mapping ─────────────────────────

/// Fallback-Box für das Pointer-zu-Workspace-Mapping, wenn keine
/// Workspace-Grenzen konfiguriert sind.
pub const POINTER_BOX_X: [f32; 2] = [-2.4, 2.4];
/// Fallback-Box, Y-Achse.
pub const POINTER_BOX_Y: [f32; 2] = [0.2, 2.4];
/// Fallback-Box, Z-Achse.
pub const POINTER_BOX_Z: [f32; 2] = [-2.0, 2.0];

// ── Modell (CAD) ────────────────────────────────────────────────────

/// Standard-Pfad zum URDF-Asset des SO-101 Modells.
pub const CAD_ASSET_PATH_DEFAULT: &str = "/assets/models/so101/so101_new_calib.urdf";
/// Standard-Skalierung des CAD-Modells.
pub const CAD_SCALE_DEFAULT: f32 = 7.8;
/// Standard-Rotation der CAD-Wurzel in Grad (XYZ-Euler).
pub const CAD_ROOT_ROTATION_DEG_DEFAULT: [f32; 3] = [-90.0, 0.0, 180.0];
/// Standard-Vorzeichen der vier IK-Gelenke beim Winkel-Mapping.
pub const CAD_JOINT_SIGNS_DEFAULT: [f32; 4] = [1.0, -1.0, -1.0, -1.0];
/// Standard-Offsets der vier IK-Gelenke in Grad.
pub const CAD_JOINT_OFFSETS_DEG_DEFAULT: [f32; 4] = [0.0, 14.0, -8.0, 0.0];

// ── Greifer ─────────────────────────────────────────────────────────

/// Distanz, ab der der Greifer vollständig geschlossen ist.
pub const GRIPPER_CLOSE_DISTANCE_DEFAULT: f32 = 0.18;
/// Distanz, ab der der Greifer vollständig geöffnet ist.
pub const GRIPPER_OPEN_DISTANCE_DEFAULT: f32 = 0.9;
/// Gelenkwinkel des geschlossenen Greifers in Grad.
pub const GRIPPER_CLOSED_ANGLE_DEG_DEFAULT: f32 = -6.0;
/// Gelenkwinkel des geöffneten Greifers in Grad.
pub const GRIPPER_OPEN_ANGLE_DEG_DEFAULT: f32 = 34.0;
/// Glättungsfaktor der Greifer-Schließbewegung.
pub const GRIPPER_SMOOTHING_DEFAULT: f32 = 0.28;

// ── Kamera & Theme ──────────────────────────────────────────────────

/// Standard-Kameraposition.
pub const CAMERA_POSITION_DEFAULT: [f32; 3] = [1.2, 1.05, 3.1];
/// Standard-Blickpunkt der Kamera.
pub const CAMERA_LOOK_AT_DEFAULT: [f32; 3] = [0.45, 0.85, 0.0];
/// Standard-Öffnungswinkel in Grad.
pub const CAMERA_FOV_DEFAULT: f32 = 38.0;
/// Near-Plane.
pub const CAMERA_NEAR_DEFAULT: f32 = 0.1;
/// Far-Plane.
pub const CAMERA_FAR_DEFAULT: f32 = 20.0;

/// Farbe der Link-Segmente (RGBA).
pub const THEME_LINK_COLOR: [f32; 4] = [0.941, 0.953, 0.984, 1.0];
/// Farbe der Gelenk-Pucks (RGBA).
pub const THEME_JOINT_COLOR: [f32; 4] = [1.0, 0.576, 0.302, 1.0];
/// Farbe des Endeffektors (RGBA).
pub const THEME_EFFECTOR_COLOR: [f32; 4] = [0.102, 0.149, 0.22, 1.0];
/// Farbe des Ziel-Markers (RGBA).
pub const THEME_TARGET_COLOR: [f32; 4] = [0.247, 0.835, 1.0, 1.0];

// ── Enums ───────────────────────────────────────────────────────────

/// Geltungsbereich der Pointer-Interaktion.
/// Unbekannte Werte fallen auf `Hero` zurück statt den Parse abzubrechen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionScope {
    /// Pointer wirkt im gesamten Viewport
    Viewport,
    /// Voller Einfluss im Hero, gedämpfter Einfluss außerhalb
    Hybrid,
    /// Pointer wirkt nur innerhalb des Hero-Elements
    #[serde(other)]
    Hero,
}

/// Modus der Pointer-zu-3D-Projektion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerPlaneMode {
    /// Feste Welt-Ebene bei konfiguriertem Z
    WorldZ,
    /// Direktes NDC-zu-Workspace-Box-Mapping
    Workspace,
    /// Kamerarelative Ebene durch den Look-At-Punkt
    #[serde(other)]
    Camera,
}

/// IK-Strategie für das CAD-Modell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IkMode {
    /// Analytische Kettenwinkel per Sign/Offset auf benannte Gelenke mappen
    Analytic,
    /// DLS direkt auf den nativen Gelenken des geladenen Modells
    #[serde(other)]
    Urdf,
}

// ── Sub-Configs ─────────────────────────────────────────────────────

/// Gelenklimits in Grad, pro Gelenk als `[min, max]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JointLimitsConfig {
    pub yaw: [f32; 2],
    pub shoulder: [f32; 2],
    pub elbow: [f32; 2],
    pub wrist: [f32; 2],
}

impl Default for JointLimitsConfig {
    fn default() -> Self {
        Self {
            yaw: LIMIT_YAW_DEG,
            shoulder: LIMIT_SHOULDER_DEG,
            elbow: LIMIT_ELBOW_DEG,
            wrist: LIMIT_WRIST_DEG,
        }
    }
}

/// Benannte Gelenke des CAD-Modells.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JointNamesConfig {
    pub yaw: String,
    pub shoulder: String,
    pub elbow: String,
    pub wrist: String,
    pub gripper: String,
    /// Link-Frame, dessen Weltposition als Endeffektor gilt
    pub effector_frame: String,
}

impl Default for JointNamesConfig {
    fn default() -> Self {
        Self {
            yaw: "shoulder_pan".to_string(),
            shoulder: "shoulder_lift".to_string(),
            elbow: "elbow_flex".to_string(),
            wrist: "wrist_flex".to_string(),
            gripper: "gripper".to_string(),
            effector_frame: "gripper_frame_link".to_string(),
        }
    }
}

impl JointNamesConfig {
    /// Die vier IK-Gelenke in Kettenreihenfolge.
    pub fn ik_joints(&self) -> [&str; 4] {
        [&self.yaw, &self.shoulder, &self.elbow, &self.wrist]
    }
}

/// Konfiguration des CAD-Modells.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// CAD-Modell statt Primitiv-Rig verwenden
    pub use_cad: bool,
    /// Pfad zum URDF-Asset
    pub urdf: String,
    /// Skalierung der Modellwurzel
    pub scale: f32,
    /// Rotation der Modellwurzel in Grad (XYZ-Euler)
    pub root_rotation_deg: [f32; 3],
    /// Position der Modellwurzel; dient bei `use_cad` auch als Ketten-Basis
    pub root_position: [f32; 3],
    /// Benannte Gelenke
    pub joint_names: JointNamesConfig,
    /// Vorzeichen beim Winkel-Mapping (analytic-Modus)
    pub joint_signs: [f32; 4],
    /// Offsets beim Winkel-Mapping in Grad (analytic-Modus)
    pub joint_offsets_deg: [f32; 4],
    /// IK-Strategie
    pub ik_mode: IkMode,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            use_cad: false,
            urdf: CAD_ASSET_PATH_DEFAULT.to_string(),
            scale: CAD_SCALE_DEFAULT,
            root_rotation_deg: CAD_ROOT_ROTATION_DEG_DEFAULT,
            root_position: [0.0, 0.0, 0.0],
            joint_names: JointNamesConfig::default(),
            joint_signs: CAD_JOINT_SIGNS_DEFAULT,
            joint_offsets_deg: CAD_JOINT_OFFSETS_DEG_DEFAULT,
            ik_mode: IkMode::Urdf,
        }
    }
}

/// Parameter des IK-Solvers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IkConfig {
    /// Glättung des Zielpunkts pro Frame
    pub target_smoothing: f32,
    /// Glättung der Gelenkwinkel pro Frame
    pub joint_smoothing: f32,
    /// DLS-Iterationen der Seed-Verfeinerung
    pub iterations: u32,
    /// DLS-Dämpfung der Seed-Verfeinerung
    pub damping: f32,
    /// Konvergenz-Epsilon (Positionsfehler)
    pub epsilon: f32,
    /// Maximaler Winkelschritt pro Iteration in Grad
    pub max_step_deg: f32,
    /// Optionaler Per-Frame-Refine auf der Live-Kette (0 = aus)
    pub refine_iterations: u32,
    /// Dämpfung des Per-Frame-Refine
    pub refine_damping: f32,
    /// Maximaler Schritt des Per-Frame-Refine in Grad
    pub refine_max_step_deg: f32,
    /// Iterationen des Refine-Passes nach dem Collision-Guard
    pub post_guard_refine_iterations: u32,
    /// Werkzeug-Pitch in Grad
    pub tool_pitch_deg: f32,
    /// Ellbogen-Lösung nach oben statt nach unten
    pub elbow_up: bool,
    /// Mischfaktor aktueller Pose → analytischer Seed
    pub analytic_seed_blend: f32,
    /// Selbstkollisions-Guard aktiv
    pub self_collision_guard: bool,
    /// Bevorzugtes Ellbogen-Vorzeichen (>= 0 → +1, sonst −1)
    pub elbow_preferred_sign: f32,
    /// Minimaler Ellbogen-Betragswinkel in Grad
    pub elbow_min_abs_deg: f32,
    /// Freiraum-Radius um die Basissäule; `None` → aus Link-Längen abgeleitet
    pub base_clearance_radius: Option<f32>,
    /// Zielpunkt vor dem Solve in den Workspace projizieren
    pub clamp_workspace: bool,
    /// Iterationen der nativen CAD-IK
    pub urdf_iterations: u32,
    /// Dämpfung der nativen CAD-IK
    pub urdf_damping: f32,
    /// Epsilon der nativen CAD-IK
    pub urdf_epsilon: f32,
    /// Maximaler Schritt der nativen CAD-IK in Grad
    pub urdf_max_step_deg: f32,
}

impl Default for IkConfig {
    fn default() -> Self {
        Self {
            target_smoothing: TARGET_SMOOTHING_DEFAULT,
            joint_smoothing: JOINT_SMOOTHING_DEFAULT,
            iterations: IK_ITERATIONS_DEFAULT,
            damping: IK_DAMPING_DEFAULT,
            epsilon: IK_EPSILON_DEFAULT,
            max_step_deg: IK_MAX_STEP_DEG_DEFAULT,
            refine_iterations: 0,
            refine_damping: FRAME_REFINE_DAMPING_DEFAULT,
            refine_max_step_deg: FRAME_REFINE_MAX_STEP_DEG_DEFAULT,
            post_guard_refine_iterations: POST_GUARD_REFINE_ITERATIONS_DEFAULT,
            tool_pitch_deg: TOOL_PITCH_DEG_DEFAULT,
            elbow_up: false,
            analytic_seed_blend: ANALYTIC_SEED_BLEND_DEFAULT,
            self_collision_guard: true,
            elbow_preferred_sign: -1.0,
            elbow_min_abs_deg: ELBOW_MIN_ABS_DEG_DEFAULT,
            base_clearance_radius: None,
            clamp_workspace: true,
            urdf_iterations: URDF_ITERATIONS_DEFAULT,
            urdf_damping: URDF_DAMPING_DEFAULT,
            urdf_epsilon: URDF_EPSILON_DEFAULT,
            urdf_max_step_deg: URDF_MAX_STEP_DEG_DEFAULT,
        }
    }
}

impl IkConfig {
    /// Normiertes Ellbogen-Vorzeichen: genau `+1.0` oder `-1.0`.
    pub fn preferred_elbow_sign(&self) -> f32 {
        if self.elbow_preferred_sign >= 0.0 {
            1.0
        } else {
            -1.0
        }
    }
}

/// Workspace-Grenzen. Fehlende Achsen bleiben unbeschränkt.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    pub min_x: Option<f32>,
    pub max_x: Option<f32>,
    pub min_y: Option<f32>,
    pub max_y: Option<f32>,
    pub min_z: Option<f32>,
    pub max_z: Option<f32>,
    /// Maximaler Radius um die Basis
    pub radius: Option<f32>,
    /// Minimaler Radius um die Basis (Totzone)
    pub min_radius: Option<f32>,
}

/// Pointer-Interaktionsverhalten.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Geltungsbereich der Pointer-Interaktion
    pub scope: InteractionScope,
    /// Pointer-Gewicht innerhalb des Hero-Elements
    pub hero_weight: f32,
    /// Pointer-Gewicht außerhalb des Heros (nur `hybrid`)
    pub global_weight: f32,
    /// Dämpfung der Zielglättung außerhalb des Heros (nur `hybrid`)
    pub global_idle_damping: f32,
    /// Feste Z-Ebene für das Pointer-Mapping
    pub mouse_plane_z: Option<f32>,
    /// Projektionsmodus
    pub pointer_plane_mode: PointerPlaneMode,
    /// Verschiebung der Kamera-Ebene entlang der Blickrichtung
    pub pointer_plane_offset: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            scope: InteractionScope::Hero,
            hero_weight: 1.0,
            global_weight: 0.25,
            global_idle_damping: 0.92,
            mouse_plane_z: None,
            pointer_plane_mode: PointerPlaneMode::Camera,
            pointer_plane_offset: 0.0,
        }
    }
}

/// Distanzgesteuerter Greifer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GripperConfig {
    pub enabled: bool,
    pub close_distance: f32,
    pub open_distance: f32,
    pub closed_angle_deg: f32,
    pub open_angle_deg: f32,
    pub smoothing: f32,
}

impl Default for GripperConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            close_distance: GRIPPER_CLOSE_DISTANCE_DEFAULT,
            open_distance: GRIPPER_OPEN_DISTANCE_DEFAULT,
            closed_angle_deg: GRIPPER_CLOSED_ANGLE_DEG_DEFAULT,
            open_angle_deg: GRIPPER_OPEN_ANGLE_DEG_DEFAULT,
            smoothing: GRIPPER_SMOOTHING_DEFAULT,
        }
    }
}

/// Perspektivkamera der Szene.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub look_at: [f32; 3],
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: CAMERA_POSITION_DEFAULT,
            look_at: CAMERA_LOOK_AT_DEFAULT,
            fov: CAMERA_FOV_DEFAULT,
            near: CAMERA_NEAR_DEFAULT,
            far: CAMERA_FAR_DEFAULT,
        }
    }
}

/// Farbschema (RGBA, 0..1).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub link: [f32; 4],
    pub joint: [f32; 4],
    pub effector: [f32; 4],
    pub target: [f32; 4],
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            link: THEME_LINK_COLOR,
            joint: THEME_JOINT_COLOR,
            effector: THEME_EFFECTOR_COLOR,
            target: THEME_TARGET_COLOR,
        }
    }
}

// ── Haupt-Config ────────────────────────────────────────────────────

/// Vollständige, validierte Hero-Konfiguration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HeroConfig {
    /// Animation überhaupt aktiv
    pub enabled: bool,
    /// Reduced-Motion- und Viewport-Breiten-Gates ignorieren
    pub force_interactive: bool,
    /// Minimale Viewport-Breite für den interaktiven Modus
    pub desktop_min_width: f32,
    /// Debug: Software-Renderer erlauben wenn GPU fehlt
    pub debug_allow_software_fallback: bool,
    /// Debug: Primitiv-Rig als Überbrückung während das CAD-Asset lädt
    /// oder als Ersatz wenn kein CAD-Loader verfügbar ist
    pub debug_allow_primitive_fallback: bool,
    /// Basisposition der Kette (ignoriert wenn `model.use_cad`)
    pub base_position: [f32; 3],
    /// Höhe der Basissäule
    pub base_height: f32,
    /// Link-Längen
    pub arm_lengths: [f32; 3],
    /// Startwinkel in Grad
    pub initial_angles_deg: [f32; 4],
    /// Gelenklimits in Grad
    pub joint_limits_deg: JointLimitsConfig,
    /// Legacy-Feld: feste Pointer-Ebene; wandert bei `normalize()`
    /// nach `interaction.mouse_plane_z` wenn dort nichts gesetzt ist
    pub mouse_plane_z: Option<f32>,
    pub model: ModelConfig,
    pub ik: IkConfig,
    pub workspace: WorkspaceConfig,
    pub interaction: InteractionConfig,
    pub gripper: GripperConfig,
    pub camera: CameraConfig,
    pub theme: ThemeConfig,
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            force_interactive: false,
            desktop_min_width: DESKTOP_MIN_WIDTH_DEFAULT,
            debug_allow_software_fallback: false,
            debug_allow_primitive_fallback: false,
            base_position: [0.0, 0.0, 0.0],
            base_height: BASE_HEIGHT_DEFAULT,
            arm_lengths: ARM_LENGTHS_DEFAULT,
            initial_angles_deg: INITIAL_ANGLES_DEG_DEFAULT,
            joint_limits_deg: JointLimitsConfig::default(),
            mouse_plane_z: None,
            model: ModelConfig::default(),
            ik: IkConfig::default(),
            workspace: WorkspaceConfig::default(),
            interaction: InteractionConfig::default(),
            gripper: GripperConfig::default(),
            camera: CameraConfig::default(),
            theme: ThemeConfig::default(),
        }
    }
}

impl HeroConfig {
    /// Löst abgeleitete Defaults auf und klemmt Wertebereiche.
    /// Wird genau einmal nach dem Parsen aufgerufen.
    pub fn normalize(&mut self) {
        if self.interaction.mouse_plane_z.is_none() {
            self.interaction.mouse_plane_z = self.mouse_plane_z;
        }

        self.interaction.hero_weight = self.interaction.hero_weight.clamp(0.0, 1.0);
        self.interaction.global_weight = self.interaction.global_weight.clamp(0.0, 1.0);
        self.interaction.global_idle_damping =
            self.interaction.global_idle_damping.clamp(0.5, 0.995);

        self.gripper.close_distance = self.gripper.close_distance.max(0.001);
        if self.gripper.open_distance <= self.gripper.close_distance {
            self.gripper.open_distance = self.gripper.close_distance + 0.2;
        }
        self.gripper.smoothing = self.gripper.smoothing.clamp(0.01, 1.0);

        self.ik.analytic_seed_blend = self.ik.analytic_seed_blend.clamp(0.0, 1.0);
        self.ik.iterations = self.ik.iterations.max(1);
        self.ik.urdf_iterations = self.ik.urdf_iterations.max(1);
    }
}

/// Parst den eingebetteten JSON-Config-Block. Der Aufrufer behandelt
/// Fehler als fehlende Konfiguration (statischer Fallback).
pub fn parse_hero_config(json: &str) -> anyhow::Result<HeroConfig> {
    let mut config: HeroConfig = serde_json::from_str(json)?;
    config.normalize();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_match_reference_values() {
        let config = HeroConfig::default();
        assert_relative_eq!(config.arm_lengths[0], 0.72);
        assert_relative_eq!(config.base_height, 0.24);
        assert_relative_eq!(config.ik.analytic_seed_blend, 0.68);
        assert_eq!(config.ik.iterations, 48);
        assert_eq!(config.model.ik_mode, IkMode::Urdf);
        assert_eq!(config.interaction.scope, InteractionScope::Hero);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = parse_hero_config(r#"{ "enabled": true }"#).expect("Minimal-Config");
        assert!(config.enabled);
        assert_relative_eq!(config.ik.target_smoothing, 0.22);
    }

    #[test]
    fn test_unknown_enum_values_fall_back() {
        let config = parse_hero_config(
            r#"{
                "enabled": true,
                "interaction": { "scope": "galaxy", "pointer_plane_mode": "hyperbolic" },
                "model": { "ik_mode": "quantum" }
            }"#,
        )
        .expect("Unbekannte Enum-Werte dürfen den Parse nicht abbrechen");
        assert_eq!(config.interaction.scope, InteractionScope::Hero);
        assert_eq!(
            config.interaction.pointer_plane_mode,
            PointerPlaneMode::Camera
        );
        assert_eq!(config.model.ik_mode, IkMode::Urdf);
    }

    #[test]
    fn test_parse_error_on_invalid_json() {
        assert!(parse_hero_config("{ nicht json").is_err());
    }

    #[test]
    fn test_normalize_resolves_legacy_plane_and_gripper_band() {
        let mut config = HeroConfig {
            mouse_plane_z: Some(0.4),
            ..HeroConfig::default()
        };
        config.gripper.close_distance = 0.5;
        config.gripper.open_distance = 0.3;
        config.interaction.global_idle_damping = 0.1;
        config.normalize();

        assert_relative_eq!(config.interaction.mouse_plane_z.unwrap(), 0.4);
        assert!(config.gripper.open_distance > config.gripper.close_distance);
        assert_relative_eq!(config.interaction.global_idle_damping, 0.5);
    }

    #[test]
    fn test_interaction_mouse_plane_z_wins_over_legacy() {
        let mut config = HeroConfig {
            mouse_plane_z: Some(0.4),
            ..HeroConfig::default()
        };
        config.interaction.mouse_plane_z = Some(-0.2);
        config.normalize();
        assert_relative_eq!(config.interaction.mouse_plane_z.unwrap(), -0.2);
    }
}
