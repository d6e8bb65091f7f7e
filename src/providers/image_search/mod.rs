//! Stock image search provider (Unsplash).

mod api;
pub mod fallback;
mod finder;

pub use api::UnsplashApi;
pub use finder::{CoverImageFinder, ImageSearchCall};
