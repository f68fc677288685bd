//! Wire types for the comparison service.
//!
//! These mirror what the server sends back. The client never derives
//! costs from them; they only exist so responses can be shown as tables.

use serde::{Deserialize, Serialize};

/// One model as returned by the listing and search endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelRecord {
    pub provider: String,
    pub model_family: String,
    pub model_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_window: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multilingual: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vision: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fine_tuning: Option<bool>,
    #[serde(alias = "streaming", skip_serializing_if = "Option::is_none")]
    pub realtime_streaming: Option<bool>,
}

impl ModelRecord {
    /// Case-insensitive substring match on provider, family and name.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.provider.to_lowercase().contains(&needle)
            || self.model_family.to_lowercase().contains(&needle)
            || self.model_name.to_lowercase().contains(&needle)
    }

    pub fn to_ref(&self) -> ModelRef {
        ModelRef {
            provider: self.provider.clone(),
            model_family: self.model_family.clone(),
            model_name: self.model_name.clone(),
        }
    }
}

/// The identifying triple a spec file uses to point at a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRef {
    pub provider: String,
    pub model_family: String,
    pub model_name: String,
}

/// Caller identification echoed back by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub agent_id: String,
    pub task_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

impl Metadata {
    pub fn new(agent_id: &str, task_id: &str, message_id: &str, thread_id: &str) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            task_id: task_id.to_string(),
            message_id: Some(message_id.to_string()),
            thread_id: Some(thread_id.to_string()),
        }
    }
}

/// A priced line item, computed server-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostItem {
    pub provider: String,
    pub model_family: String,
    pub model_name: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub input_price: f64,
    pub output_price: f64,
    pub input_cost: f64,
    pub output_cost: f64,
    pub total_cost: f64,
}

impl CostItem {
    /// `provider/model_name`, the way the service labels options.
    pub fn label(&self) -> String {
        format!("{}/{}", self.provider, self.model_name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompareResponse {
    #[serde(default)]
    pub comparisons: Vec<CostItem>,
    pub cheapest_option: Option<CostItem>,
    pub metadata: Option<Metadata>,
    pub transaction_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalculateResponse {
    #[serde(default)]
    pub calculations: Vec<CostItem>,
    pub total_cost: f64,
    pub metadata: Option<Metadata>,
    pub transaction_id: Option<String>,
}

/// Search body. Unset criteria are left out of the request entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchCriteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_context: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_context: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_output_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multilingual: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vision: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fine_tuning: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realtime_streaming: Option<bool>,
}

impl SearchCriteria {
    /// Reject bounds that can never match.
    pub fn validate(&self) -> Result<(), String> {
        if let (Some(min), Some(max)) = (self.min_context, self.max_context) {
            if min > max {
                return Err(format!(
                    "--min-context ({min}) must not exceed --max-context ({max})"
                ));
            }
        }
        if let (Some(min), Some(max)) = (self.min_output_tokens, self.max_output_tokens) {
            if min > max {
                return Err(format!(
                    "--min-output-tokens ({min}) must not exceed --max-output-tokens ({max})"
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub metadata: Metadata,
    #[serde(flatten)]
    pub criteria: SearchCriteria,
}

impl SearchRequest {
    pub fn new(criteria: SearchCriteria) -> Self {
        Self {
            metadata: Metadata {
                agent_id: "cli".to_string(),
                task_id: "search".to_string(),
                message_id: None,
                thread_id: None,
            },
            criteria,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_model_record_tolerates_partial_and_unknown_fields() {
        let record: ModelRecord = serde_json::from_value(json!({
            "provider": "openai",
            "model_family": "gpt-4o",
            "model_name": "gpt-4o-mini",
            "streaming": true,
            "release_date": "2024-07-18"
        }))
        .unwrap();
        assert_eq!(record.model_name, "gpt-4o-mini");
        assert_eq!(record.realtime_streaming, Some(true));
        assert_eq!(record.context_window, None);
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let record = ModelRecord {
            provider: "Together".to_string(),
            model_family: "Qwen".to_string(),
            model_name: "Qwen2.5-7B-Instruct".to_string(),
            ..Default::default()
        };
        assert!(record.matches("qwen2.5"));
        assert!(record.matches("TOGETHER"));
        assert!(!record.matches("anthropic"));
    }

    #[test]
    fn test_search_body_omits_unset_criteria() {
        let request = SearchRequest::new(SearchCriteria {
            min_context: Some(8000),
            max_context: Some(32000),
            ..Default::default()
        });
        let body = serde_json::to_value(&request).unwrap();
        let object = body.as_object().unwrap();
        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(keys, vec!["max_context", "metadata", "min_context"]);
        assert_eq!(body["min_context"], 8000);
        assert_eq!(body["max_context"], 32000);
        assert_eq!(body["metadata"], json!({"agent_id": "cli", "task_id": "search"}));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let criteria = SearchCriteria {
            min_context: Some(32000),
            max_context: Some(8000),
            ..Default::default()
        };
        assert!(criteria.validate().is_err());

        let criteria = SearchCriteria {
            min_output_tokens: Some(4096),
            max_output_tokens: Some(4096),
            ..Default::default()
        };
        assert!(criteria.validate().is_ok());
    }

    #[test]
    fn test_cost_item_label() {
        let item = CostItem {
            provider: "together".to_string(),
            model_name: "qwen".to_string(),
            ..Default::default()
        };
        assert_eq!(item.label(), "together/qwen");
    }
}
