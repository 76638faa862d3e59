//! Kinematik-Kern: Kette, FK, IK, Workspace, Kamera und Zielauflösung.

pub mod camera;
pub mod chain;
pub mod fk;
pub mod ik;
pub mod target;
pub mod workspace;

pub use camera::HeroCamera;
pub use chain::{JointLimit, KinematicChain, JOINT_COUNT};
pub use fk::{forward_kinematics, FkResult};
pub use ik::{
    apply_self_collision_guards, base_clearance_radius, solve_dls_ik, solve_so_position_ik,
    DlsParams,
};
pub use target::{idle_target, PointerState, PointerTracker, TargetResolver};
pub use workspace::clamp_target;
