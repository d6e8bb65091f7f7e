pub mod blog;
pub mod gemini;
pub mod image;
pub mod plan;
pub mod unsplash;

pub use blog::{BlogDraft, BlogSection};
pub use gemini::{GeminiErrorBody, GeminiGenerateContentRequest, GeminiResponseBody};
pub use image::ImageResult;
pub use plan::{BudgetEstimate, MvpPlan, PlanFeature, PlanPhase, TechStack};
pub use unsplash::{UnsplashErrorBody, UnsplashSearchResponse};
