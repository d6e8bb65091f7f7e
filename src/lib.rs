pub mod blog;
pub mod config;
pub mod db;
pub mod error;
pub mod keys;
pub mod providers;
pub mod rotation;
pub mod server;
pub mod utils;

pub use error::ForgeError;
pub use rotation::{CallError, Invocation, RotatingClient};
