//! Prompt templates for Svar.
//!
//! Prompts can be customized by placing TOML files in the custom prompts
//! directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub qa: QaPrompts,
    pub rewrite: RewritePrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompt for answer synthesis over transcript context.
///
/// The template has exactly two slots, `{{context}}` and `{{question}}`, and
/// its text enforces the answer-only-from-context contract including the
/// "I don't know." fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QaPrompts {
    pub template: String,
}

impl Default for QaPrompts {
    fn default() -> Self {
        Self {
            template: r#"You are an assistant helping with analyzing user conversations.
Use ONLY the transcript chunks provided below as your reference.
If the answer is clearly implied or can be reasonably inferred from the context, answer accordingly.
If the query asks about which user answer with the "User ID" provided in context.
If the context does not provide enough information, respond with "I don't know."

Context:
{{context}}

Question:
{{question}}

Answer:"#
                .to_string(),
        }
    }
}

/// Prompt for the optional query rewrite step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewritePrompts {
    pub template: String,
}

impl Default for RewritePrompts {
    fn default() -> Self {
        Self {
            template: r#"You are a helpful assistant that rewrites user queries into a clear, formal, and standardized format for search and retrieval.

Follow these guidelines:
- Simplify informal or idiomatic phrases into formal, searchable language.
- Preserve the original intent of the query.
- If the query refers to a user by numeric ID (e.g., "user id 203"), rewrite it in the format: "User ID: user_203".
- If a language is mentioned (e.g., Hindi, Telugu), ensure it's spelled in full (not as codes like 'hi' or 'te').
- If a date or time reference is mentioned (e.g., "this week", "May 2024", "on 10th March"), convert it to ISO 8601 format if possible, or leave as a normalized date phrase for filtering (e.g., "between 2024-05-01 and 2024-05-07").

Only rewrite the query. Do not add explanations or extra context.

Query:
{{query}}

Rewritten query:"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory
    /// and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let qa_path = custom_path.join("qa.toml");
            if qa_path.exists() {
                let content = std::fs::read_to_string(&qa_path)?;
                prompts.qa = toml::from_str(&content)?;
            }

            let rewrite_path = custom_path.join("rewrite.toml");
            if rewrite_path.exists() {
                let content = std::fs::read_to_string(&rewrite_path)?;
                prompts.rewrite = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom
    /// config variables. Provided variables take precedence.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts_have_required_slots() {
        let prompts = Prompts::default();
        assert!(prompts.qa.template.contains("{{context}}"));
        assert!(prompts.qa.template.contains("{{question}}"));
        assert!(prompts.qa.template.contains("I don't know."));
        assert!(prompts.rewrite.template.contains("{{query}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = std::collections::HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }
}
