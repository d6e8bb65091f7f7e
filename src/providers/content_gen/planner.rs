use async_trait::async_trait;
use ideaforge_schema::{GeminiGenerateContentRequest, MvpPlan};
use serde::{Deserialize, Serialize};

use super::api::GeminiApi;
use super::fallback;
use crate::providers::ProviderKind;
use crate::rotation::{CallError, ProviderCall, RotatingClient};

const PLAN_SYSTEM_PROMPT: &str = "You are a pragmatic startup advisor. Answer with a single JSON \
object with the keys title, summary, features (name, description, priority: must|should|could), \
techStack (frontend, backend, database, hosting: string arrays), budget (currency, min, max, \
notes) and timeline (name, weeks, deliverables). No prose outside the JSON.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub idea: String,
    #[serde(default)]
    pub audience: Option<String>,
    #[serde(default, alias = "budgetHint")]
    pub budget_hint: Option<String>,
}

impl PlanRequest {
    pub fn new(idea: impl Into<String>) -> Self {
        Self {
            idea: idea.into(),
            audience: None,
            budget_hint: None,
        }
    }

    fn prompt(&self) -> String {
        let mut prompt = format!(
            "Draft an MVP plan for this startup idea:\n{}\n",
            self.idea.trim()
        );
        if let Some(audience) = self.audience.as_deref().filter(|a| !a.trim().is_empty()) {
            prompt.push_str(&format!("Target audience: {}\n", audience.trim()));
        }
        if let Some(budget) = self.budget_hint.as_deref().filter(|b| !b.trim().is_empty()) {
            prompt.push_str(&format!("Budget: {}\n", budget.trim()));
        }
        prompt
    }
}

/// Idea → `MvpPlan` on the content-gen provider.
pub struct PlanCall {
    api: GeminiApi,
}

impl PlanCall {
    pub fn new(api: GeminiApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ProviderCall for PlanCall {
    type Request = PlanRequest;
    type Output = MvpPlan;

    fn provider(&self) -> ProviderKind {
        ProviderKind::ContentGen
    }

    async fn call(&self, secret: &str, request: &PlanRequest) -> Result<MvpPlan, CallError> {
        if request.idea.trim().is_empty() {
            return Err(CallError::validation("idea must not be empty"));
        }
        let body =
            GeminiGenerateContentRequest::from_prompt(Some(PLAN_SYSTEM_PROMPT), request.prompt())
                .with_json_output(0.7);
        let plan: MvpPlan = self.api.generate_json(secret, &body).await?;
        if !plan.is_complete() {
            return Err(CallError::validation("model returned an incomplete plan"));
        }
        Ok(plan)
    }

    fn fallback(&self, request: &PlanRequest) -> MvpPlan {
        fallback::mvp_plan(request)
    }
}

pub type MvpPlanner = RotatingClient<PlanCall>;
