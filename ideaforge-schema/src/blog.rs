use serde::{Deserialize, Serialize};

/// Generated blog post before it is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogDraft {
    pub title: String,
    pub excerpt: String,
    #[serde(default)]
    pub sections: Vec<BlogSection>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogSection {
    pub heading: String,
    pub body: String,
}

impl BlogDraft {
    /// Render the draft as markdown, one `##` heading per section.
    pub fn to_markdown(&self) -> String {
        let mut out = format!("# {}\n\n{}\n", self.title.trim(), self.excerpt.trim());
        for section in &self.sections {
            out.push_str("\n## ");
            out.push_str(section.heading.trim());
            out.push_str("\n\n");
            out.push_str(section.body.trim());
            out.push('\n');
        }
        out
    }
}
