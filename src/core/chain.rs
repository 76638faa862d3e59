//! Kinematische Kette des SO-101 Arms: Link-Längen, Gelenklimits,
//! aktuelle Winkel und Basispose.

use glam::Vec3;

use crate::config::HeroConfig;

/// Anzahl der IK-Gelenke (Yaw, Schulter, Ellbogen, Handgelenk).
pub const JOINT_COUNT: usize = 4;

/// Gelenklimit in Radiant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointLimit {
    pub min: f32,
    pub max: f32,
}

impl JointLimit {
    /// Erstellt ein Limit aus Grad-Werten.
    pub fn from_degrees(pair: [f32; 2]) -> Self {
        Self {
            min: pair[0].to_radians(),
            max: pair[1].to_radians(),
        }
    }

    /// Klemmt einen Winkel in das Limit.
    pub fn clamp(&self, angle: f32) -> f32 {
        angle.clamp(self.min, self.max)
    }
}

/// 4-DoF-Kette mit fester Form (Längen, Limits) und veränderlichen Winkeln.
///
/// Invariante: nach jeder Mutation liegt jeder Winkel innerhalb seines
/// Limits (`clamp_to_limits`).
#[derive(Debug, Clone)]
pub struct KinematicChain {
    /// Basisposition in Weltkoordinaten
    pub base: Vec3,
    /// Höhe der Basissäule bis zum Schultergelenk
    pub base_height: f32,
    /// Link-Längen (Schulter→Ellbogen, Ellbogen→Handgelenk, Handgelenk→Effektor)
    pub lengths: [f32; 3],
    /// Aktuelle Gelenkwinkel in Radiant
    pub angles: [f32; JOINT_COUNT],
    /// Gelenklimits in Radiant
    pub limits: [JointLimit; JOINT_COUNT],
}

impl KinematicChain {
    /// Baut die Kette aus der Konfiguration.
    ///
    /// Bei `model.use_cad` dient die deklarierte Modellwurzel als Basis,
    /// damit Kette und CAD-Darstellung denselben Ursprung teilen.
    pub fn from_config(config: &HeroConfig) -> Self {
        let base_position = if config.model.use_cad {
            config.model.root_position
        } else {
            config.base_position
        };

        let limits = [
            JointLimit::from_degrees(config.joint_limits_deg.yaw),
            JointLimit::from_degrees(config.joint_limits_deg.shoulder),
            JointLimit::from_degrees(config.joint_limits_deg.elbow),
            JointLimit::from_degrees(config.joint_limits_deg.wrist),
        ];

        let mut chain = Self {
            base: Vec3::from_array(base_position),
            base_height: config.base_height,
            lengths: config.arm_lengths,
            angles: config.initial_angles_deg.map(f32::to_radians),
            limits,
        };
        chain.clamp_to_limits();
        chain
    }

    /// Klemmt alle Winkel in ihre Limits.
    pub fn clamp_to_limits(&mut self) {
        for (angle, limit) in self.angles.iter_mut().zip(self.limits.iter()) {
            *angle = limit.clamp(*angle);
        }
    }

    /// Glättet die Winkel exponentiell Richtung `desired` und klemmt sie.
    pub fn smooth_towards(&mut self, desired: &[f32; JOINT_COUNT], alpha: f32) {
        for i in 0..JOINT_COUNT {
            self.angles[i] += (desired[i] - self.angles[i]) * alpha;
            self.angles[i] = self.limits[i].clamp(self.angles[i]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HeroConfig;
    use approx::assert_relative_eq;

    #[test]
    fn test_chain_from_default_config() {
        let chain = KinematicChain::from_config(&HeroConfig::default());
        assert_relative_eq!(chain.lengths[0], 0.72);
        assert_relative_eq!(chain.base_height, 0.24);
        assert_relative_eq!(chain.angles[0], 12.0_f32.to_radians());
        assert_relative_eq!(chain.limits[2].max, 25.0_f32.to_radians());
    }

    #[test]
    fn test_chain_uses_cad_root_position_as_base() {
        let mut config = HeroConfig::default();
        config.base_position = [1.0, 0.0, 0.0];
        config.model.use_cad = true;
        config.model.root_position = [0.0, 0.5, -0.25];

        let chain = KinematicChain::from_config(&config);
        assert_relative_eq!(chain.base.y, 0.5);
        assert_relative_eq!(chain.base.z, -0.25);
    }

    #[test]
    fn test_initial_angles_are_clamped_into_limits() {
        let mut config = HeroConfig::default();
        config.initial_angles_deg = [500.0, -500.0, 0.0, 0.0];
        let chain = KinematicChain::from_config(&config);
        assert_relative_eq!(chain.angles[0], chain.limits[0].max);
        assert_relative_eq!(chain.angles[1], chain.limits[1].min);
    }

    #[test]
    fn test_smooth_towards_respects_limits() {
        let mut chain = KinematicChain::from_config(&HeroConfig::default());
        let desired = [10.0, 10.0, 10.0, 10.0];
        chain.smooth_towards(&desired, 1.0);
        for i in 0..JOINT_COUNT {
            assert!(chain.angles[i] <= chain.limits[i].max + 1e-6);
        }
    }
}
