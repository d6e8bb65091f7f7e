mod error;
mod generate_content_request;
mod generate_content_response;

pub use error::{GeminiErrorBody, GeminiErrorObject};
pub use generate_content_request::{Content, GeminiGenerateContentRequest, GenerationConfig, Part};
pub use generate_content_response::{Candidate, GeminiResponseBody};
