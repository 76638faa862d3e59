//! Hybrider IK-Solver: analytischer 2-Link-Seed plus gedämpfte
//! Least-Squares-Verfeinerung (DLS), danach Selbstkollisions-Guard.
//!
//! Der Solver arbeitet immer auf einer Kopie der Kette; die Live-Winkel
//! werden erst durch die Frame-Glättung bewegt.

use glam::{Mat3, Vec3};

use crate::config::{
    IkConfig, POST_GUARD_REFINE_DAMPING, POST_GUARD_REFINE_MAX_STEP_DEG,
};
use crate::core::chain::{KinematicChain, JOINT_COUNT};
use crate::core::fk::{forward_kinematics, FkResult};

/// Abbruchschwelle der Determinante von `J·Jᵗ + λ²I`.
const SINGULARITY_EPSILON: f32 = 1e-9;

/// Untergrenze des abgeleiteten Freiraum-Radius um die Basissäule.
const BASE_CLEARANCE_FLOOR: f32 = 0.34;

/// Parametersatz eines DLS-Laufs.
#[derive(Debug, Clone, Copy)]
pub struct DlsParams {
    pub iterations: u32,
    pub damping: f32,
    pub epsilon: f32,
    pub max_step_deg: f32,
}

impl DlsParams {
    /// Parameter der Seed-Verfeinerung.
    pub fn seed(ik: &IkConfig) -> Self {
        Self {
            iterations: ik.iterations,
            damping: ik.damping,
            epsilon: ik.epsilon,
            max_step_deg: ik.max_step_deg,
        }
    }

    /// Sanfter Nachlauf, nachdem der Guard die Pose verschoben hat.
    pub fn post_guard_refine(ik: &IkConfig) -> Self {
        Self {
            iterations: ik.post_guard_refine_iterations,
            damping: POST_GUARD_REFINE_DAMPING,
            epsilon: ik.epsilon,
            max_step_deg: POST_GUARD_REFINE_MAX_STEP_DEG,
        }
    }

    /// Optionaler Per-Frame-Refine auf der Live-Kette.
    pub fn frame_refine(ik: &IkConfig) -> Self {
        Self {
            iterations: ik.refine_iterations,
            damping: ik.refine_damping,
            epsilon: ik.epsilon,
            max_step_deg: ik.refine_max_step_deg,
        }
    }
}

/// Gedämpfte Least-Squares-Iteration auf der übergebenen Kette.
///
/// Der Positionsfehler ist dreidimensional, daher genügt eine 3×3-Normal-
/// gleichung `(J·Jᵗ + λ²I)·p = e`; die Gelenkschritte sind `Jᵗ·p`, pro
/// Iteration auf `max_step_deg` begrenzt und sofort in die Limits geklemmt.
pub fn solve_dls_ik(chain: &mut KinematicChain, target: Vec3, params: &DlsParams) -> FkResult {
    let damping_sq = params.damping * params.damping;
    let max_step = params.max_step_deg.to_radians();

    for _ in 0..params.iterations {
        let fk = forward_kinematics(chain);
        let error = target - fk.end_effector;
        if error.length() < params.epsilon {
            return fk;
        }

        let mut columns = [Vec3::ZERO; JOINT_COUNT];
        for (j, column) in columns.iter_mut().enumerate() {
            *column = fk.joint_axes[j].cross(fk.end_effector - fk.joint_positions[j]);
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

        for j in 0..JOINT_COUNT {
            let delta = columns[j].dot(projected).clamp(-max_step, max_step);
            chain.angles[j] = chain.limits[j].clamp(chain.angles[j] + delta);
        }
    }

    forward_kinematics(chain)
}

/// Löst die Zielposition für die 4-DoF-Kette.
///
/// Reihenfolge: analytischer Seed (Yaw + 2-Link in der Armebene), Blend in
/// die aktuelle Pose, DLS-Verfeinerung, Selbstkollisions-Guard und ein
/// kurzer Refine-Pass, damit der Guard den Zielpunkt nicht zu weit
/// wegdrückt. Die Eingabekette bleibt unverändert.
pub fn solve_so_position_ik(chain: &KinematicChain, target: Vec3, ik: &IkConfig) -> [f32; 4] {
    let [l1, l2, l3] = chain.lengths;
    let local = target - chain.base - Vec3::new(0.0, chain.base_height, 0.0);

    // Yaw sign is inverted to match the current world transform convention.
    let yaw = (-local.z).atan2(local.x);

    let pitch = ik.tool_pitch_deg.to_radians();
    let mut radial = local.x.hypot(local.z);
    let mut vertical = local.y;

    // Handgelenk-Zentrum: Werkzeuglänge entlang des gewünschten Pitch abziehen.
    radial += l3 * pitch.sin();
    vertical -= l3 * pitch.cos();

    // Our planar chain is defined from +Y with rotations around Z:
    // radial = -L*sin(theta), vertical = L*cos(theta).
    // Convert to standard 2-link form where angle zero is +X:
    // x_std = vertical, y_std = -radial.
    let x_std = vertical;
    let y_std = -radial;

    let min_reach = (l1 - l2).abs() + 1e-6;
    let max_reach = (l1 + l2 - 1e-6).max(min_reach);
    let dist = x_std.hypot(y_std).clamp(min_reach, max_reach);

    let elbow_sign = if ik.elbow_up { 1.0 } else { -1.0 };
    let cos_elbow = ((dist * dist - l1 * l1 - l2 * l2) / (2.0 * l1 * l2)).clamp(-1.0, 1.0);
    let elbow = elbow_sign * cos_elbow.acos();
    let shoulder =
        y_std.atan2(x_std) - (l2 * elbow.sin()).atan2(l1 + l2 * elbow.cos());
    let wrist = pitch - shoulder - elbow;

    let mut desired = [yaw, shoulder, elbow, wrist];
    for (angle, limit) in desired.iter_mut().zip(chain.limits.iter()) {
        *angle = limit.clamp(*angle);
    }

    let mut scratch = chain.clone();
    let blend = ik.analytic_seed_blend;
    for i in 0..JOINT_COUNT {
        scratch.angles[i] += (desired[i] - scratch.angles[i]) * blend;
    }
    scratch.clamp_to_limits();

    solve_dls_ik(&mut scratch, target, &DlsParams::seed(ik));
    apply_self_collision_guards(&mut scratch, ik);

    if ik.post_guard_refine_iterations > 0 {
        solve_dls_ik(&mut scratch, target, &DlsParams::post_guard_refine(ik));
        apply_self_collision_guards(&mut scratch, ik);
    }

    scratch.angles
}

/// Biegt die Pose von der Basissäule weg.
///
/// Zwei Stufen: erst das bevorzugte Ellbogen-Vorzeichen mit Mindestbetrag
/// erzwingen, dann Arm-Segmente proportional zur Eindringtiefe aus dem
/// Freiraum-Radius herausdrehen.
pub fn apply_self_collision_guards(chain: &mut KinematicChain, ik: &IkConfig) {
    if !ik.self_collision_guard {
        return;
    }

    let sign = ik.preferred_elbow_sign();
    let min_abs = ik.elbow_min_abs_deg.to_radians();
    if chain.angles[2] * sign < min_abs {
        chain.angles[2] = sign * min_abs;
    }
    chain.clamp_to_limits();

    let clearance = base_clearance_radius(chain, ik);
    let fk = forward_kinematics(chain);
    let distance = min_base_segment_distance(&fk, chain.base);
    if distance < clearance {
        let ratio = ((clearance - distance) / clearance).clamp(0.0, 1.0);
        chain.angles[1] += 14.0_f32.to_radians() * ratio;
        chain.angles[2] += 20.0_f32.to_radians() * sign * ratio;
        chain.angles[3] -= 8.0_f32.to_radians() * sign * ratio;
        chain.clamp_to_limits();
    }
}

/// Freiraum-Radius um die Basissäule.
pub fn base_clearance_radius(chain: &KinematicChain, ik: &IkConfig) -> f32 {
    if let Some(radius) = ik.base_clearance_radius {
        if radius > 0.0 {
            return radius;
        }
    }
    let [l1, l2, _] = chain.lengths;
    BASE_CLEARANCE_FLOOR.max((l1 * 0.24).min(l2 * 0.27))
}

/// Kleinster Abstand der Arm-Segmente (Oberarm, Unterarm, Hand) zur Basis.
pub fn min_base_segment_distance(fk: &FkResult, base: Vec3) -> f32 {
    let mut min = f32::INFINITY;
    for (start, end) in &fk.segments[1..] {
        min = min.min(point_to_segment_distance(base, *start, *end));
    }
    min
}

/// Abstand eines Punkts zur Strecke `a`→`b`.
pub fn point_to_segment_distance(point: Vec3, a: Vec3, b: Vec3) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-12 {
        return (point - a).length();
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (point - (a + ab * t)).length()
}
