//! Offline templates used when no content-gen key can serve a request.
//!
//! Everything here is a pure function of its input so repeated fallbacks for the same
//! request produce the same document.

use ideaforge_schema::{
    BlogDraft, BlogSection, BudgetEstimate, MvpPlan, PlanFeature, PlanPhase, TechStack,
};

use super::planner::PlanRequest;

const DEFAULT_AUDIENCE: &str = "early adopters";

/// (min, max) in USD.
const BOOTSTRAP_BAND: (u32, u32) = (5_000, 15_000);
const LOW_BAND: (u32, u32) = (2_000, 8_000);
const MEDIUM_BAND: (u32, u32) = (15_000, 40_000);
const HIGH_BAND: (u32, u32) = (40_000, 120_000);

pub fn mvp_plan(request: &PlanRequest) -> MvpPlan {
    let idea = request.idea.trim();
    let audience = request
        .audience
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .unwrap_or(DEFAULT_AUDIENCE);
    let (min, max) = budget_band(request.budget_hint.as_deref());

    MvpPlan {
        title: format!("MVP plan: {idea}"),
        summary: format!(
            "A lean first version of \"{idea}\" for {audience}. Ship the smallest useful \
             workflow, measure real usage and expand from there."
        ),
        features: vec![
            feature(
                "Core workflow",
                &format!("The single end-to-end flow that delivers \"{idea}\" to {audience}."),
                "must",
            ),
            feature(
                "Accounts and onboarding",
                "Email sign-up, login and a short guided first run.",
                "must",
            ),
            feature(
                "Feedback capture",
                "In-app feedback form and basic product analytics.",
                "should",
            ),
            feature(
                "Admin dashboard",
                "Manage users and content without touching the database.",
                "could",
            ),
        ],
        tech_stack: TechStack {
            frontend: strings(&["React", "TypeScript", "Tailwind CSS"]),
            backend: strings(&["Node.js", "Express"]),
            database: strings(&["PostgreSQL"]),
            hosting: strings(&["Vercel", "Render"]),
        },
        budget: BudgetEstimate {
            currency: "USD".to_string(),
            min,
            max,
            notes: Some("Template estimate; refine once scope is confirmed.".to_string()),
        },
        timeline: vec![
            phase("Discovery", 2, &["User interviews", "Scope and wireframes"]),
            phase("Build", 6, &["Core workflow", "Accounts", "Admin dashboard"]),
            phase("Beta", 2, &["Private beta", "Feedback triage"]),
            phase("Launch", 2, &["Public launch", "Post-launch metrics review"]),
        ],
    }
}

pub fn blog_draft(topic: &str) -> BlogDraft {
    let topic = topic.trim();
    BlogDraft {
        title: format!("{}: a practical guide for founders", capitalize(topic)),
        excerpt: format!(
            "What founders should know about {topic}, and how to act on it this week."
        ),
        sections: vec![
            BlogSection {
                heading: format!("Why {topic} matters"),
                body: format!(
                    "Early-stage teams have little time and less money. Understanding {topic} \
                     helps you spend both on the work that moves the product forward."
                ),
            },
            BlogSection {
                heading: "Getting started".to_string(),
                body: format!(
                    "Pick one measurable goal related to {topic}, set a two-week deadline and \
                     review the result with your users."
                ),
            },
            BlogSection {
                heading: "Common pitfalls".to_string(),
                body: "Over-building before validating demand, and measuring vanity metrics \
                       instead of retention."
                    .to_string(),
            },
        ],
        tags: vec!["startups".to_string(), "mvp".to_string()],
    }
}

fn budget_band(hint: Option<&str>) -> (u32, u32) {
    let Some(hint) = hint.map(str::trim).filter(|h| !h.is_empty()) else {
        return BOOTSTRAP_BAND;
    };
    if let Some(amount) = parse_amount(hint) {
        return (amount / 4 * 3, amount);
    }
    let hint = hint.to_ascii_lowercase();
    if ["low", "small", "tight", "minimal"].iter().any(|w| hint.contains(w)) {
        LOW_BAND
    } else if ["high", "large", "enterprise", "funded"].iter().any(|w| hint.contains(w)) {
        HIGH_BAND
    } else if ["medium", "mid", "moderate"].iter().any(|w| hint.contains(w)) {
        MEDIUM_BAND
    } else {
        BOOTSTRAP_BAND
    }
}

/// First number in `hint`, honoring `,` separators and a `k` suffix (`"$20k"` → 20000).
fn parse_amount(hint: &str) -> Option<u32> {
    let start = hint.find(|c: char| c.is_ascii_digit())?;
    let rest = &hint[start..];
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == ','))
        .unwrap_or(rest.len());
    let digits: String = rest[..end].chars().filter(char::is_ascii_digit).collect();
    let value: u32 = digits.parse().ok()?;
    let thousands = rest[end..]
        .chars()
        .next()
        .is_some_and(|c| c.eq_ignore_ascii_case(&'k'));
    let value = if thousands {
        value.checked_mul(1_000)?
    } else {
        value
    };
    (value > 0).then_some(value)
}

fn feature(name: &str, description: &str, priority: &str) -> PlanFeature {
    PlanFeature {
        name: name.to_string(),
        description: description.to_string(),
        priority: priority.to_string(),
    }
}

fn phase(name: &str, weeks: u32, deliverables: &[&str]) -> PlanPhase {
    PlanPhase {
        name: name.to_string(),
        weeks,
        deliverables: strings(deliverables),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
