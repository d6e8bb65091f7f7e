//! Auto-blog: a topic queue drained on a timer into stored posts.

mod scheduler;
mod slug;

pub use scheduler::{BlogPipeline, BlogSchedulerHandle, spawn};
pub use slug::slugify;
