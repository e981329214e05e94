//! Prompt templates for Docent.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub conversation: ConversationPrompts,
    pub sql: SqlPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Role-labelling templates for the conversation gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationPrompts {
    /// Used when the caller supplies context.
    pub with_context: String,
    /// Used when there is no context.
    pub without_context: String,
}

impl Default for ConversationPrompts {
    fn default() -> Self {
        Self {
            with_context: "{{context}}\nUser: {{message}}\nBot:".to_string(),
            without_context: "User: {{message}}\nBot:".to_string(),
        }
    }
}

/// Instructional prefix for natural language to SQL conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlPrompts {
    pub user: String,
}

impl Default for SqlPrompts {
    fn default() -> Self {
        Self {
            user: "Convert the following natural language query into an SQL statement:\n\nQuery: {{query}}\nSQL:"
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let conversation_path = custom_path.join("conversation.toml");
            if conversation_path.exists() {
                let content = std::fs::read_to_string(&conversation_path)?;
                prompts.conversation = toml::from_str(&content)?;
            }

            let sql_path = custom_path.join("sql.toml");
            if sql_path.exists() {
                let content = std::fs::read_to_string(&sql_path)?;
                prompts.sql = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Substitution is single-pass: values are inserted verbatim and never
    /// re-scanned, so user text containing `{{...}}` survives untouched.
    /// Unknown placeholders are left as-is.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    let key = &after[..end];
                    match vars.get(key) {
                        Some(value) => result.push_str(value),
                        None => {
                            result.push_str("{{");
                            result.push_str(key);
                            result.push_str("}}");
                        }
                    }
                    rest = &after[end + 2..];
                }
                None => {
                    result.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        result.push_str(rest);
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
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
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.conversation.with_context.contains("{{context}}"));
        assert!(prompts.sql.user.starts_with("Convert the following"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_render_does_not_rescan_values() {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), "literal {{message}} here".to_string());
        vars.insert("message".to_string(), "hi".to_string());

        let result = Prompts::render("{{context}}\nUser: {{message}}", &vars);
        assert_eq!(result, "literal {{message}} here\nUser: hi");
    }

    #[test]
    fn test_render_keeps_unknown_and_unclosed() {
        let vars = HashMap::new();
        assert_eq!(Prompts::render("a {{x}} b {{y", &vars), "a {{x}} b {{y");
    }

    #[test]
    fn test_custom_variables_are_overridden() {
        let mut custom = HashMap::new();
        custom.insert("company".to_string(), "Acme".to_string());
        custom.insert("query".to_string(), "ignored".to_string());
        let prompts = Prompts::load(None, Some(&custom)).unwrap();

        let mut vars = HashMap::new();
        vars.insert("query".to_string(), "list users".to_string());
        let rendered = prompts.render_with_custom("{{company}}: {{query}}", &vars);
        assert_eq!(rendered, "Acme: list users");
    }

    #[test]
    fn test_load_custom_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("sql.toml"),
            "user = \"SQL please: {{query}}\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.sql.user, "SQL please: {{query}}");
        assert_eq!(
            prompts.conversation.without_context,
            ConversationPrompts::default().without_context
        );
    }
}
