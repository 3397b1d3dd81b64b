//! Shared data types for the attack engine: no IO, no async, no provider
//! wiring. Every other crate in the workspace depends on this one.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod candidate;
mod config;
mod dialog;
mod ids;
mod proofs;
mod turn;

pub use candidate::{AttackResult, AttemptRecord};
pub use config::{Configuration, ConfigurationError, Strategy};
pub use dialog::{CompletedTurn, Dialog};
pub use ids::{BranchId, StreamId};
pub use proofs::{EmptyStringError, NonEmptyString};
pub use turn::{Role, Turn};
