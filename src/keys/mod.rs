//! Provider keys: store seam, selection, usage accounting.

mod accountant;
mod bootstrap;
mod memory;
mod reset_job;
mod selector;
mod store;

pub use accountant::UsageAccountant;
pub use bootstrap::seed_keys;
pub use memory::MemoryKeyStore;
pub use reset_job::spawn_reset_job;
pub use selector::{KeyLease, select_key};
pub use store::KeyStore;
