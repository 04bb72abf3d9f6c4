//! Query classification.

use crate::rag::ask::Assistant;
use crate::rag::types::QueryKind;
use hurtbot_core::AppResult;
use hurtbot_prompt::CLASSIFY_PROMPT_ID;
use std::collections::HashMap;

const CLASSIFY_TEMPERATURE: f32 = 0.0;

impl Assistant {
    /// Label a query. Any failure is logged and yields [`QueryKind::General`].
    pub async fn classify(&self, query: &str) -> QueryKind {
        match self.try_classify(query).await {
            Ok(kind) => kind,
            Err(e) => {
                tracing::error!("Query classification failed: {}", e);
                QueryKind::General
            }
        }
    }

    pub async fn try_classify(&self, query: &str) -> AppResult<QueryKind> {
        let mut variables = HashMap::new();
        variables.insert("query".to_string(), query.to_string());

        // Labels must be reproducible, whatever the synthesis temperature
        let label = self
            .complete_prompt(CLASSIFY_PROMPT_ID, variables, CLASSIFY_TEMPERATURE)
            .await?;
        tracing::debug!("Classifier replied: {}", label);

        Ok(parse_label(&label))
    }
}

/// `materials_calculation` anywhere in the reply wins; anything else is general.
pub fn parse_label(reply: &str) -> QueryKind {
    if reply.contains(QueryKind::MaterialsCalculation.as_str()) {
        QueryKind::MaterialsCalculation
    } else {
        QueryKind::General
    }
}
