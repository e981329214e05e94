//! Natural language to SQL through the conversation model.

use super::Warned;
use crate::gateway::ConversationGateway;
use std::collections::HashMap;
use tracing::warn;

/// Ask the model to turn a question into SQL. The output is not validated.
pub async fn natural_language_to_sql(gateway: &ConversationGateway, query: &str) -> Warned<String> {
    let query = query.trim();
    if query.is_empty() {
        return Warned::warn(String::new(), "Please enter a query.");
    }

    let prompts = gateway.prompts();
    let mut vars = HashMap::new();
    vars.insert("query".to_string(), query.to_string());
    let prompt = prompts.render_with_custom(&prompts.sql.user, &vars);

    match gateway.complete(&prompt).await {
        Ok(sql) => Warned::ok(sql.trim().to_string()),
        Err(e) => {
            warn!("SQL generation failed: {}", e);
            Warned::warn(String::new(), format!("SQL generation error: {}", e))
        }
    }
}
