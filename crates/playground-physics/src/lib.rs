// playground-physics: rapier2d backend for the playground simulator.
//
// `PhysicsContext` owns every rapier set and pipeline object. The engine
// builds bodies and colliders from contours, joins agent parts with
// revolute joints, and collects the touching collider pairs after each
// sub-step for interaction dispatch.

pub mod body;
pub mod context;
pub mod hooks;
pub mod joint;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        body::{BodyKind, ColliderSpec},
        context::{CollisionPair, PhysicsContext},
        hooks::SameGroupFilter,
        joint::{GRASP_PIN_COUNT, PivotSpec},
    };
    pub use rapier2d::prelude::{ColliderHandle, ImpulseJointHandle, RigidBodyHandle};
}

pub use context::PhysicsContext;
