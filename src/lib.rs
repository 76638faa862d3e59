//! SO-101 Hero-Animation Library.
//! Kinematik, IK-Solver und Render-Lifecycle als Library exportiert für
//! Hosts und Tests.

pub mod boot;
pub mod config;
pub mod core;
pub mod diag;
pub mod render;
pub mod session;

pub use boot::{
    BootOrchestrator, HeroEvent, HeroPhase, BOOT_RETRY_INTERVAL_MS, MAX_BOOT_RETRIES,
    POINTER_SUPPRESSION_MS,
};
pub use config::{parse_hero_config, HeroConfig, IkMode, InteractionScope, PointerPlaneMode};
pub use self::core::{
    forward_kinematics, solve_so_position_ik, FkResult, HeroCamera, KinematicChain, PointerState,
    TargetResolver,
};
pub use diag::WarnSink;
pub use render::{
    ArticulatedModel, BackendProxy, CadLoadStatus, HostCapabilities, HostEnv, RendererKind,
    SceneEngine,
};
pub use session::{RenderSession, SessionStatus, INITIAL_TARGET, STATUS_POLL_INTERVAL_MS};
