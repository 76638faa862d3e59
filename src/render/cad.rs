//! CAD-Darstellung: geladenes Gelenkmodell, Frame-Transform zwischen Welt-
//! und Modellraum, native IK und distanzgesteuerter Greifer.

use glam::{EulerRot, Mat3, Quat, Vec3};

use crate::config::{GripperConfig, IkConfig, IkMode, ModelConfig};
use crate::core::chain::JOINT_COUNT;
use crate::diag::WarnSink;
use crate::render::engine::{ArticulatedModel, Transform};

/// Abbruchschwelle der Determinante, identisch zur Ketten-IK.
const SINGULARITY_EPSILON: f32 = 1e-9;

/// Geladenes CAD-Modell plus Abbildung der Ketten-Konvention auf die
/// nativen Gelenke (Vorzeichen und Offsets pro Gelenk).
pub struct CadVisual {
    model: Box<dyn ArticulatedModel>,
    ik_joints: [String; JOINT_COUNT],
    gripper_joint: String,
    effector_frame: String,
    signs: [f32; JOINT_COUNT],
    /// Offsets in Radiant
    offsets: [f32; JOINT_COUNT],
    ik_mode: IkMode,
    root_rotation: Quat,
    root_position: Vec3,
    scale: f32,
    gripper_angle: Option<f32>,
}

impl CadVisual {
    /// Übernimmt das geladene Modell, setzt die Wurzel-Transform und prüft
    /// die konfigurierten Gelenknamen. Fehlende Gelenke werden einmalig
    /// gemeldet, das Modell bleibt trotzdem nutzbar.
    pub fn new(mut model: Box<dyn ArticulatedModel>, config: &ModelConfig, warn: &mut WarnSink) -> Self {
        let rotation_deg = config.root_rotation_deg;
        let root_rotation = Quat::from_euler(
            EulerRot::XYZ,
            rotation_deg[0].to_radians(),
            rotation_deg[1].to_radians(),
            rotation_deg[2].to_radians(),
        );
        let root_position = Vec3::from_array(config.root_position);

        model.set_root_transform(Transform {
            translation: root_position,
            rotation: root_rotation,
            scale: Vec3::splat(config.scale),
        });

        let names = config.joint_names.ik_joints().map(str::to_string);
        for name in &names {
            if !model.has_joint(name) {
                warn.warn_once(
                    &format!("cad-joint-missing:{name}"),
                    &format!("CAD-Gelenk '{name}' fehlt im geladenen Modell"),
                );
            }
        }

        Self {
            model,
            ik_joints: names,
            gripper_joint: config.joint_names.gripper.clone(),
            effector_frame: config.joint_names.effector_frame.clone(),
            signs: config.joint_signs,
            offsets: config.joint_offsets_deg.map(f32::to_radians),
            ik_mode: config.ik_mode,
            root_rotation,
            root_position,
            scale: config.scale.max(1e-6),
            gripper_angle: None,
        }
    }

    pub fn ik_mode(&self) -> IkMode {
        self.ik_mode
    }

    /// Modellraum → Weltraum.
    pub fn local_to_world(&self, local: Vec3) -> Vec3 {
        self.root_position + self.root_rotation * (local * self.scale)
    }

    /// Weltraum → Modellraum.
    pub fn world_to_local(&self, world: Vec3) -> Vec3 {
        (self.root_rotation.inverse() * (world - self.root_position)) / self.scale
    }

    /// Weltposition des Effektor-Frames, falls das Modell ihn kennt.
    pub fn effector_world(&self) -> Option<Vec3> {
        self.model
            .link_position(&self.effector_frame)
            .map(|local| self.local_to_world(local))
    }

    /// Überträgt analytische Kettenwinkel per Vorzeichen und Offset auf die
    /// nativen Gelenke (`analytic`-Modus).
    pub fn apply_mapped_angles(&mut self, chain_angles: [f32; JOINT_COUNT]) {
        for i in 0..JOINT_COUNT {
            let name = self.ik_joints[i].clone();
            let mut native = chain_angles[i] * self.signs[i] + self.offsets[i];
            if let Some([min, max]) = self.model.joint_limits(&name) {
                native = native.clamp(min, max);
            }
            self.model.set_joint_angle(&name, native);
        }
    }

    /// DLS direkt auf den nativen Gelenken des Modells (`urdf`-Modus).
    ///
    /// Der Zielpunkt wird in den Modellraum transformiert; Jacobian-Spalten
    /// entstehen aus den vom Modell gemeldeten Gelenkachsen und -ursprüngen.
    /// Gelenke, die das Modell nicht kennt, tragen nicht bei.
    pub fn solve_urdf_position_ik(
        &mut self,
        world_target: Vec3,
        ik: &IkConfig,
        warn: &mut WarnSink,
    ) {
        let target = self.world_to_local(world_target);
        let max_step = ik.urdf_max_step_deg.to_radians();
        let damping_sq = ik.urdf_damping * ik.urdf_damping;

        for _ in 0..ik.urdf_iterations {
            let Some(effector) = self.model.link_position(&self.effector_frame) else {
                warn.warn_once(
                    "cad-effector-missing",
                    &format!("Effektor-Frame '{}' fehlt im CAD-Modell", self.effector_frame),
                );
                return;
            };
            let error = target - effector;
            if error.length() < ik.urdf_epsilon {
                break;
            }

            let mut columns = [Vec3::ZERO; JOINT_COUNT];
            for i in 0..JOINT_COUNT {
                let name = &self.ik_joints[i];
                if let (Some(origin), Some(axis)) =
                    (self.model.joint_origin(name), self.model.joint_axis(name))
                {
                    columns[i] = axis.cross(effector - origin);
                }
            }

            let mut jjt = Mat3::ZERO;
            for column in &columns {
                jjt += Mat3::from_cols(*column * column.x, *column * column.y, *column * column.z);
            }
            jjt += Mat3::IDENTITY * damping_sq;
            if jjt.determinant().abs() < SINGULARITY_EPSILON {
                break;
            }
            let projected = jjt.inverse() * error;

            for i in 0..JOINT_COUNT {
                let name = self.ik_joints[i].clone();
                let Some(current) = self.model.joint_angle(&name) else {
                    continue;
                };
                let delta = columns[i].dot(projected).clamp(-max_step, max_step);
                let mut next = current + delta;
                if let Some([min, max]) = self.model.joint_limits(&name) {
                    next = next.clamp(min, max);
                }
                self.model.set_joint_angle(&name, next);
            }

            self.enforce_elbow_guard(ik);
        }
    }

    /// Hält das native Ellbogengelenk auf dem bevorzugten Ketten-Vorzeichen.
    fn enforce_elbow_guard(&mut self, ik: &IkConfig) {
        if !ik.self_collision_guard {
            return;
        }
        let name = self.ik_joints[2].clone();
        let Some(native) = self.model.joint_angle(&name) else {
            return;
        };
        let sign = self.signs[2];
        if sign.abs() < 1e-6 {
            return;
        }
        let chain_angle = (native - self.offsets[2]) / sign;
        let preferred = ik.preferred_elbow_sign();
        let min_abs = ik.elbow_min_abs_deg.to_radians();
        if chain_angle * preferred < min_abs {
            let mut fixed = preferred * min_abs * sign + self.offsets[2];
            if let Some([min, max]) = self.model.joint_limits(&name) {
                fixed = fixed.clamp(min, max);
            }
            self.model.set_joint_angle(&name, fixed);
        }
    }

    /// Öffnet oder schließt den Greifer abhängig vom Abstand Effektor→Ziel.
    pub fn update_gripper_from_proximity(
        &mut self,
        distance: f32,
        gripper: &GripperConfig,
        warn: &mut WarnSink,
    ) {
        if !gripper.enabled {
            return;
        }
        if !self.model.has_joint(&self.gripper_joint) {
            warn.warn_once(
                "cad-gripper-missing",
                &format!("Greifer-Gelenk '{}' fehlt im CAD-Modell", self.gripper_joint),
            );
            return;
        }

        let band = (gripper.open_distance - gripper.close_distance).max(1e-6);
        let t = ((distance - gripper.close_distance) / band).clamp(0.0, 1.0);
        let desired = (gripper.closed_angle_deg
            + (gripper.open_angle_deg - gripper.closed_angle_deg) * t)
            .to_radians();

        let smoothed = match self.gripper_angle {
            Some(previous) => previous + (desired - previous) * gripper.smoothing,
            None => desired,
        };
        self.gripper_angle = Some(smoothed);
        let name = self.gripper_joint.clone();
        self.model.set_joint_angle(&name, smoothed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HeroConfig;
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    /// Drehteller-Modell: ein Yaw-Gelenk im Ursprung, der Effektor kreist
    /// im Radius 1 um die Y-Achse. Fehlende Gelenke sind konfigurierbar.
    struct TurntableModel {
        angles: HashMap<String, f32>,
        missing: Vec<String>,
    }

    impl TurntableModel {
        fn new(missing: &[&str]) -> Self {
            let mut angles = HashMap::new();
            for name in [
                "shoulder_pan",
                "shoulder_lift",
                "elbow_flex",
                "wrist_flex",
                "gripper",
            ] {
                if !missing.contains(&name) {
                    angles.insert(name.to_string(), 0.0);
                }
            }
            Self {
                angles,
                missing: missing.iter().map(|s| s.to_string()).collect(),
            }
        }

        fn yaw(&self) -> f32 {
            self.angles.get("shoulder_pan").copied().unwrap_or(0.0)
        }
    }

    impl ArticulatedModel for TurntableModel {
        fn has_joint(&self, name: &str) -> bool {
            !self.missing.iter().any(|m| m == name) && self.angles.contains_key(name)
        }

        fn joint_angle(&self, name: &str) -> Option<f32> {
            self.angles.get(name).copied()
        }

        fn set_joint_angle(&mut self, name: &str, angle: f32) {
            if let Some(slot) = self.angles.get_mut(name) {
                *slot = angle;
            }
        }

        fn joint_limits(&self, _name: &str) -> Option<[f32; 2]> {
            None
        }

        fn joint_origin(&self, name: &str) -> Option<Vec3> {
            self.angles.get(name).map(|_| Vec3::ZERO)
        }

        fn joint_axis(&self, name: &str) -> Option<Vec3> {
            match name {
                "shoulder_pan" => Some(Vec3::Y),
                _ => None,
            }
        }

        fn link_position(&self, name: &str) -> Option<Vec3> {
            if name != "gripper_frame_link" {
                return None;
            }
            let yaw = self.yaw();
            Some(Vec3::new(yaw.cos(), 0.0, -yaw.sin()))
        }

        fn set_root_transform(&mut self, _transform: Transform) {}
    }

    fn identity_model_config() -> ModelConfig {
        ModelConfig {
            use_cad: true,
            scale: 1.0,
            root_rotation_deg: [0.0, 0.0, 0.0],
            root_position: [0.0, 0.0, 0.0],
            ..Default::default()
        }
    }

    #[test]
    fn test_world_local_round_trip() {
        let mut warn = WarnSink::new();
        let mut config = ModelConfig::default();
        config.root_position = [0.2, 0.1, -0.3];
        let visual = CadVisual::new(Box::new(TurntableModel::new(&[])), &config, &mut warn);

        let world = Vec3::new(0.8, 1.2, -0.4);
        let round_trip = visual.local_to_world(visual.world_to_local(world));
        assert_relative_eq!(round_trip.x, world.x, epsilon = 1e-4);
        assert_relative_eq!(round_trip.y, world.y, epsilon = 1e-4);
        assert_relative_eq!(round_trip.z, world.z, epsilon = 1e-4);
    }

    #[test]
    fn test_missing_joint_is_reported_once() {
        let mut warn = WarnSink::new();
        let _ = CadVisual::new(
            Box::new(TurntableModel::new(&["wrist_flex"])),
            &ModelConfig::default(),
            &mut warn,
        );
        assert!(warn.has_warned("cad-joint-missing:wrist_flex"));
        assert_eq!(warn.len(), 1);
    }

    #[test]
    fn test_mapped_angles_apply_sign_and_offset() {
        let mut warn = WarnSink::new();
        let config = identity_model_config();
        let mut visual =
            CadVisual::new(Box::new(TurntableModel::new(&[])), &config, &mut warn);

        let chain_angles = [
            10.0_f32.to_radians(),
            20.0_f32.to_radians(),
            (-30.0_f32).to_radians(),
            40.0_f32.to_radians(),
        ];
        visual.apply_mapped_angles(chain_angles);

        // Vorzeichen [1, -1, -1, -1], Offsets [0, 14, -8, 0] Grad.
        assert_relative_eq!(
            visual.model.joint_angle("shoulder_pan").unwrap(),
            10.0_f32.to_radians(),
            epsilon = 1e-5
        );
        assert_relative_eq!(
            visual.model.joint_angle("shoulder_lift").unwrap(),
            (-20.0_f32 + 14.0).to_radians(),
            epsilon = 1e-5
        );
        assert_relative_eq!(
            visual.model.joint_angle("elbow_flex").unwrap(),
            (30.0_f32 - 8.0).to_radians(),
            epsilon = 1e-5
        );
        assert_relative_eq!(
            visual.model.joint_angle("wrist_flex").unwrap(),
            (-40.0_f32).to_radians(),
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_urdf_ik_turns_towards_target() {
        let mut warn = WarnSink::new();
        let config = identity_model_config();
        let mut visual =
            CadVisual::new(Box::new(TurntableModel::new(&[])), &config, &mut warn);
        let mut ik = HeroConfig::default().ik;
        ik.self_collision_guard = false;
        ik.urdf_iterations = 200;

        // Ziel bei 90° Drehtellerwinkel.
        visual.solve_urdf_position_ik(Vec3::new(0.0, 0.0, -1.0), &ik, &mut warn);
        let effector = visual.effector_world().expect("Effektor-Frame vorhanden");
        assert!((effector - Vec3::new(0.0, 0.0, -1.0)).length() < 0.05);
    }

    #[test]
    fn test_missing_effector_frame_warns_and_aborts() {
        let mut warn = WarnSink::new();
        let mut config = identity_model_config();
        config.joint_names.effector_frame = "unbekannter_frame".to_string();
        let mut visual =
            CadVisual::new(Box::new(TurntableModel::new(&[])), &config, &mut warn);

        let ik = HeroConfig::default().ik;
        visual.solve_urdf_position_ik(Vec3::ONE, &ik, &mut warn);
        assert!(warn.has_warned("cad-effector-missing"));
    }

    #[test]
    fn test_gripper_follows_distance_band() {
        let mut warn = WarnSink::new();
        let config = identity_model_config();
        let mut visual =
            CadVisual::new(Box::new(TurntableModel::new(&[])), &config, &mut warn);
        let mut gripper = GripperConfig::default();
        gripper.smoothing = 1.0;

        visual.update_gripper_from_proximity(0.0, &gripper, &mut warn);
        assert_relative_eq!(
            visual.model.joint_angle("gripper").unwrap(),
            gripper.closed_angle_deg.to_radians(),
            epsilon = 1e-5
        );

        visual.update_gripper_from_proximity(5.0, &gripper, &mut warn);
        assert_relative_eq!(
            visual.model.joint_angle("gripper").unwrap(),
            gripper.open_angle_deg.to_radians(),
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_missing_gripper_joint_warns_once() {
        let mut warn = WarnSink::new();
        let config = identity_model_config();
        let mut visual = CadVisual::new(
            Box::new(TurntableModel::new(&["gripper"])),
            &config,
            &mut warn,
        );
        let gripper = GripperConfig::default();
        visual.update_gripper_from_proximity(0.3, &gripper, &mut warn);
        visual.update_gripper_from_proximity(0.5, &gripper, &mut warn);
        assert!(warn.has_warned("cad-gripper-missing"));
    }
}
