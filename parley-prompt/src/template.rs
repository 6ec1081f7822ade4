use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

fn placeholder() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{\{\s*(\w+)\s*\}\}").expect("placeholder pattern is valid"))
}

/// A `{{name}}` placeholder template. Substitution is a single pass over the
/// template text, so placeholders inside substituted values stay literal.
/// Unknown placeholders render as the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    pub fn render(&self, vars: &HashMap<&str, &str>) -> String {
        placeholder()
            .replace_all(&self.template, |caps: &regex::Captures| {
                vars.get(&caps[1]).copied().unwrap_or_default().to_string()
            })
            .into_owned()
    }

    pub fn render_one(&self, key: &str, value: &str) -> String {
        self.render(&HashMap::from([(key, value)]))
    }
}
