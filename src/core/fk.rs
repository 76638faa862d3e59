//! Vorwärtskinematik der 4-DoF-Kette.
//!
//! Die Rotationsreihenfolge ist fest: Yaw um die Welt-Y-Achse, danach drei
//! körperfeste Rotationen um die lokale Z-Achse. Jeder Link zeigt in seiner
//! Ruhelage entlang +Y.

use glam::{Mat3, Vec3};

use crate::core::chain::{KinematicChain, JOINT_COUNT};

/// Vollständiges FK-Ergebnis eines Auswertedurchlaufs.
///
/// `segments` enthält die vier Strecken Basis→Schulter, Schulter→Ellbogen,
/// Ellbogen→Handgelenk, Handgelenk→Effektor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FkResult {
    /// Gelenkursprünge (Basis, Schulter, Ellbogen, Handgelenk)
    pub joint_positions: [Vec3; JOINT_COUNT],
    /// Momentane Drehachsen der Gelenke in Weltkoordinaten
    pub joint_axes: [Vec3; JOINT_COUNT],
    /// Position des Endeffektors
    pub end_effector: Vec3,
    /// Start/Ende jedes Kettensegments
    pub segments: [(Vec3, Vec3); JOINT_COUNT],
}

/// Wertet die Kette bei ihren aktuellen Winkeln aus.
///
/// Die Funktion ist rein und deterministisch: gleiche Winkel liefern
/// bitidentische Ergebnisse.
pub fn forward_kinematics(chain: &KinematicChain) -> FkResult {
    let [a0, a1, a2, a3] = chain.angles;
    let [l1, l2, l3] = chain.lengths;

    let pos_base = chain.base;
    let axis_yaw = Vec3::Y;

    let mut rotation = Mat3::from_rotation_y(a0);
    let pos_shoulder = pos_base + rotation * Vec3::new(0.0, chain.base_height, 0.0);
    let axis_shoulder = rotation * Vec3::Z;

    rotation *= Mat3::from_rotation_z(a1);
    let pos_elbow = pos_shoulder + rotation * Vec3::new(0.0, l1, 0.0);
    let axis_elbow = rotation * Vec3::Z;

    rotation *= Mat3::from_rotation_z(a2);
    let pos_wrist = pos_elbow + rotation * Vec3::new(0.0, l2, 0.0);
    let axis_wrist = rotation * Vec3::Z;

    rotation *= Mat3::from_rotation_z(a3);
    let end_effector = pos_wrist + rotation * Vec3::new(0.0, l3, 0.0);

    FkResult {
        joint_positions: [pos_base, pos_shoulder, pos_elbow, pos_wrist],
        joint_axes: [axis_yaw, axis_shoulder, axis_elbow, axis_wrist],
        end_effector,
        segments: [
            (pos_base, pos_shoulder),
            (pos_shoulder, pos_elbow),
            (pos_elbow, pos_wrist),
            (pos_wrist, end_effector),
        ],
    }
}
