mod forge;

pub use forge::{ApiErrorBody, ApiErrorObject, ForgeError};
