//! Generative content provider (Gemini).

mod api;
mod blog_writer;
pub mod fallback;
mod planner;

pub use api::GeminiApi;
pub use blog_writer::{BlogCall, BlogWriter};
pub use planner::{MvpPlanner, PlanCall, PlanRequest};
