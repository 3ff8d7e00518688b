//! Failure classification and recovery decisions.
//!
//! Errors are typed where they are raised, so classification is a lookup on
//! [`BattleErrorKind`](battle_core::BattleErrorKind). The [`ErrorHandler`]
//! asks a [`RecoveryPolicy`] for a [`RecoveryDirective`], applies retry
//! escalation and keeps [`ErrorStatistics`].

mod handler;
mod policy;
mod statistics;

pub use handler::ErrorHandler;
pub use policy::{RecoveryDirective, RecoveryPolicy, StandardRecoveryPolicy};
pub use statistics::{ErrorRecord, ErrorStatistics, RECENT_ERROR_LIMIT};
