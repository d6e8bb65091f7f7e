//! Rotating multi-key client shared by every provider.

mod attempt;
mod client;
mod error;

pub use attempt::{AttemptOutcome, CallAttempt, Invocation};
pub use client::{ProviderCall, RotatingClient};
pub use error::CallError;
