//! MVP plan document, as produced by the model or by the offline template.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MvpPlan {
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub features: Vec<PlanFeature>,
    pub tech_stack: TechStack,
    pub budget: BudgetEstimate,
    #[serde(default)]
    pub timeline: Vec<PlanPhase>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanFeature {
    pub name: String,
    pub description: String,
    /// `"must"`, `"should"` or `"could"`.
    #[serde(default = "default_priority")]
    pub priority: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TechStack {
    #[serde(default)]
    pub frontend: Vec<String>,
    #[serde(default)]
    pub backend: Vec<String>,
    #[serde(default)]
    pub database: Vec<String>,
    #[serde(default)]
    pub hosting: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetEstimate {
    pub currency: String,
    pub min: u32,
    pub max: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanPhase {
    pub name: String,
    pub weeks: u32,
    #[serde(default)]
    pub deliverables: Vec<String>,
}

impl MvpPlan {
    /// A plan is usable when it names at least one feature and one phase.
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty()
            && !self.features.is_empty()
            && !self.timeline.is_empty()
            && self.budget.min <= self.budget.max
    }

    pub fn total_weeks(&self) -> u32 {
        self.timeline.iter().map(|p| p.weeks).sum()
    }
}

fn default_priority() -> String {
    "should".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn model_output_with_missing_optionals_parses() {
        let plan: MvpPlan = serde_json::from_value(json!({
            "title": "Dog walking marketplace",
            "summary": "Match owners with walkers",
            "features": [{"name": "Booking", "description": "Book a walk"}],
            "techStack": {"frontend": ["React"]},
            "budget": {"currency": "USD", "min": 5000, "max": 12000},
            "timeline": [{"name": "Build", "weeks": 6}]
        }))
        .unwrap();

        assert_eq!(plan.features[0].priority, "should");
        assert!(plan.tech_stack.backend.is_empty());
        assert!(plan.is_complete());
        assert_eq!(plan.total_weeks(), 6);
    }

    #[test]
    fn inverted_budget_is_incomplete() {
        let plan = MvpPlan {
            title: "x".to_string(),
            summary: String::new(),
            features: vec![PlanFeature {
                name: "a".to_string(),
                description: "b".to_string(),
                priority: "must".to_string(),
            }],
            tech_stack: TechStack::default(),
            budget: BudgetEstimate {
                currency: "USD".to_string(),
                min: 10,
                max: 1,
                notes: None,
            },
            timeline: vec![PlanPhase {
                name: "p".to_string(),
                weeks: 1,
                deliverables: vec![],
            }],
        };
        assert!(!plan.is_complete());
    }
}
