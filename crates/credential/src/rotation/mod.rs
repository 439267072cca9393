//! Access key rotation
//!
//! A pass runs in fixed stages:
//!
//! 1. **List** the identity's keys ([`KeyStore::list`](crate::traits::KeyStore::list))
//! 2. **Classify** them by age ([`classify`])
//! 3. **Plan** deletions and whether to mint a replacement ([`plan`])
//! 4. **Execute** the plan ([`RotationExecutor`])
//!
//! Steps 2 and 3 are pure. [`Rotator`] drives the whole pass.

pub mod classifier;
pub mod error;
pub mod executor;
pub mod planner;
pub mod policy;
pub mod rotator;
pub mod state;

pub use classifier::{Classification, ClassifiedKey, classify};
pub use error::{ContractViolation, RotationError, RotationResult};
pub use executor::{RotationExecutor, RotationReport};
pub use planner::{RotationPlan, plan};
pub use policy::{DEFAULT_MAX_AGE_DAYS, DEFAULT_MAX_KEY_COUNT, RotationPolicy};
pub use rotator::{Rotator, RotatorBuilder};
pub use state::RotationStage;
