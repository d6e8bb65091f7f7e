pub mod guards;
pub mod router;
pub mod routes;

pub use router::{ForgeState, forge_router};
