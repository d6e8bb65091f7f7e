use async_trait::async_trait;
use ideaforge_schema::{BlogDraft, GeminiGenerateContentRequest};

use super::api::GeminiApi;
use super::fallback;
use crate::providers::ProviderKind;
use crate::rotation::{CallError, ProviderCall, RotatingClient};

const BLOG_SYSTEM_PROMPT: &str = "You write concise, practical blog posts for startup founders. \
Answer with a single JSON object with the keys title, excerpt (one sentence), sections (array of \
heading and body, 3 to 5 items) and tags (string array). No prose outside the JSON.";

/// Topic → `BlogDraft` on the content-gen provider.
pub struct BlogCall {
    api: GeminiApi,
}

impl BlogCall {
    pub fn new(api: GeminiApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ProviderCall for BlogCall {
    type Request = String;
    type Output = BlogDraft;

    fn provider(&self) -> ProviderKind {
        ProviderKind::ContentGen
    }

    async fn call(&self, secret: &str, topic: &String) -> Result<BlogDraft, CallError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(CallError::validation("topic must not be empty"));
        }
        let body = GeminiGenerateContentRequest::from_prompt(
            Some(BLOG_SYSTEM_PROMPT),
            format!("Write a blog post about: {topic}"),
        )
        .with_json_output(0.9);
        let draft: BlogDraft = self.api.generate_json(secret, &body).await?;
        if draft.title.trim().is_empty() || draft.sections.is_empty() {
            return Err(CallError::validation("model returned an empty draft"));
        }
        Ok(draft)
    }

    fn fallback(&self, topic: &String) -> BlogDraft {
        fallback::blog_draft(topic)
    }
}

pub type BlogWriter = RotatingClient<BlogCall>;
