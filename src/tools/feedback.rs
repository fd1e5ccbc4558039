use crate::content::ContentStore;
use crate::error::Result;
use crate::persistence::FeedbackSink;
use crate::registry::{ToolHandler, ToolOutput, ValidatedInput};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct FeedbackParams {
    text: String,
}

/// `submit_feedback`: append the text to the feedback log.
pub struct FeedbackTool {
    sink: Arc<FeedbackSink>,
}

impl FeedbackTool {
    pub fn new(sink: Arc<FeedbackSink>) -> Self {
        Self { sink }
    }
}

impl ToolHandler for FeedbackTool {
    fn call(&self, input: &ValidatedInput, _store: &ContentStore) -> Result<ToolOutput> {
        let params: FeedbackParams = input.parse()?;
        let entry = self.sink.submit(&params.text)?;

        Ok(ToolOutput {
            text: format!("Feedback received — thank you! (ID: {})", entry.id),
            structured: Some(json!({
                "id": entry.id,
                "timestamp": entry.timestamp,
            })),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::InputSchema;
    use crate::tools::FEEDBACK_SCHEMA;
    use tempfile::tempdir;

    fn validated(schema: &InputSchema, raw: serde_json::Value) -> ValidatedInput {
        schema.validate(&raw).unwrap()
    }

    #[test]
    fn test_acknowledgement_carries_id() {
        let dir = tempdir().unwrap();
        let sink = Arc::new(FeedbackSink::new(dir.path().join("feedback.json")));
        let tool = FeedbackTool::new(Arc::clone(&sink));
        let store = ContentStore::embedded().unwrap();

        let out = tool
            .call(&validated(&FEEDBACK_SCHEMA, json!({"text": "great tool"})), &store)
            .unwrap();

        let entries = sink.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, "great tool");
        assert!(out.text.contains(&entries[0].id.to_string()));
        assert_eq!(out.structured.unwrap()["id"], json!(entries[0].id));
    }
}
