//! Specification files for `compare` and `calculate`.
//!
//! Files are loaded as untyped JSON and forwarded verbatim; the server owns
//! shape validation. The typed structs here describe the documents that
//! `sample-spec` writes.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::error::{ComparerError, Result};
use crate::models::{Metadata, ModelRecord, ModelRef};

/// Which sample document to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SpecKind {
    Compare,
    Calculate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareSpec {
    pub models: Vec<ModelRef>,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculateSpec {
    pub calculations: Vec<CalculationRequest>,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    #[serde(flatten)]
    pub model: ModelRef,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// How many models a sample draws from the listing.
const SAMPLE_SIZE: usize = 2;

/// Token counts for each calculate sample entry, in order.
const CALCULATE_TOKENS: [(u64, u64); SAMPLE_SIZE] = [(1000, 500), (2000, 1000)];

/// Read a spec file and parse it as JSON without touching its shape.
pub fn load(path: &Path) -> Result<Value> {
    let contents = fs::read_to_string(path).map_err(|source| ComparerError::SpecRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ComparerError::SpecParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Pick up to two distinct models at random.
fn pick_models<R: Rng + ?Sized>(models: &[ModelRecord], rng: &mut R) -> Result<Vec<ModelRef>> {
    if models.is_empty() {
        return Err(ComparerError::NoModels);
    }
    Ok(models
        .choose_multiple(rng, SAMPLE_SIZE.min(models.len()))
        .map(ModelRecord::to_ref)
        .collect())
}

pub fn sample_compare<R: Rng + ?Sized>(models: &[ModelRecord], rng: &mut R) -> Result<CompareSpec> {
    Ok(CompareSpec {
        models: pick_models(models, rng)?,
        input_tokens: 1000,
        output_tokens: 500,
        metadata: Metadata::new("cli-sample", "comparison-test", "msg123", "thread456"),
    })
}

pub fn sample_calculate<R: Rng + ?Sized>(
    models: &[ModelRecord],
    rng: &mut R,
) -> Result<CalculateSpec> {
    let calculations = pick_models(models, rng)?
        .into_iter()
        .zip(CALCULATE_TOKENS)
        .map(|(model, (input_tokens, output_tokens))| CalculationRequest {
            model,
            input_tokens,
            output_tokens,
        })
        .collect();

    Ok(CalculateSpec {
        calculations,
        metadata: Metadata::new("cli-sample", "calculation-test", "msg789", "thread012"),
    })
}

/// Build the sample document for `kind` as pretty JSON (4-space indent).
pub fn sample_json<R: Rng + ?Sized>(
    kind: SpecKind,
    models: &[ModelRecord],
    rng: &mut R,
) -> Result<String> {
    let value = match kind {
        SpecKind::Compare => serde_json::to_value(sample_compare(models, rng)?),
        SpecKind::Calculate => serde_json::to_value(sample_calculate(models, rng)?),
    }
    .map_err(ComparerError::Serialize)?;
    to_pretty(&value, b"    ")
}

/// Serialize with a custom indent.
pub fn to_pretty(value: &Value, indent: &[u8]) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .map_err(ComparerError::Serialize)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn listing() -> Vec<ModelRecord> {
        [
            ("openai", "gpt-4o", "gpt-4o-mini"),
            ("anthropic", "claude-3", "claude-3-haiku"),
            ("together", "qwen", "Qwen2.5-7B-Instruct-Turbo"),
            ("groq", "llama-3", "llama-3.1-8b-instant"),
        ]
        .iter()
        .map(|(provider, family, name)| ModelRecord {
            provider: provider.to_string(),
            model_family: family.to_string(),
            model_name: name.to_string(),
            context_window: Some(128_000),
            ..Default::default()
        })
        .collect()
    }

    fn assert_metadata_keys(value: &Value) {
        let metadata = value["metadata"].as_object().expect("metadata object");
        for key in ["agent_id", "task_id", "message_id", "thread_id"] {
            assert!(
                metadata.get(key).and_then(Value::as_str).is_some(),
                "missing metadata key {key}"
            );
        }
    }

    #[test]
    fn test_compare_sample_round_trips() {
        let mut rng = StdRng::seed_from_u64(7);
        let json = sample_json(SpecKind::Compare, &listing(), &mut rng).unwrap();

        let spec: CompareSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(spec.models.len(), 2);
        assert_ne!(spec.models[0], spec.models[1]);
        assert_eq!(spec.input_tokens, 1000);
        assert_eq!(spec.output_tokens, 500);
        assert_eq!(spec.metadata.task_id, "comparison-test");

        let value: Value = serde_json::from_str(&json).unwrap();
        assert_metadata_keys(&value);
        // Only the identifying triple is carried over from the listing.
        assert!(value["models"][0].get("context_window").is_none());
    }

    #[test]
    fn test_calculate_sample_round_trips() {
        let mut rng = StdRng::seed_from_u64(11);
        let json = sample_json(SpecKind::Calculate, &listing(), &mut rng).unwrap();

        let spec: CalculateSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(spec.calculations.len(), 2);
        assert_eq!(
            (spec.calculations[0].input_tokens, spec.calculations[0].output_tokens),
            (1000, 500)
        );
        assert_eq!(
            (spec.calculations[1].input_tokens, spec.calculations[1].output_tokens),
            (2000, 1000)
        );
        assert_eq!(spec.metadata.message_id.as_deref(), Some("msg789"));

        let value: Value = serde_json::from_str(&json).unwrap();
        assert_metadata_keys(&value);
        assert_eq!(value["calculations"][0]["input_tokens"], 1000);
        assert!(value["calculations"][0]["provider"].is_string());
    }

    #[test]
    fn test_samples_draw_from_listing() {
        let models = listing();
        let known: HashSet<String> = models.iter().map(|m| m.model_name.clone()).collect();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let spec = sample_compare(&models, &mut rng).unwrap();
            assert!(spec.models.iter().all(|m| known.contains(&m.model_name)));
        }
    }

    #[test]
    fn test_single_model_listing_yields_one_item() {
        let models = listing()[..1].to_vec();
        let mut rng = StdRng::seed_from_u64(1);
        let spec = sample_calculate(&models, &mut rng).unwrap();
        assert_eq!(spec.calculations.len(), 1);
    }

    #[test]
    fn test_empty_listing_is_error() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            sample_compare(&[], &mut rng),
            Err(ComparerError::NoModels)
        ));
    }

    #[test]
    fn test_load_reports_missing_and_invalid_files() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.json");
        assert!(matches!(load(&missing), Err(ComparerError::SpecRead { .. })));

        let invalid = dir.path().join("invalid.json");
        fs::write(&invalid, "{\"models\": [").unwrap();
        let err = load(&invalid).unwrap_err();
        assert!(matches!(err, ComparerError::SpecParse { .. }));
        assert!(err.to_string().contains("invalid.json"));
    }

    #[test]
    fn test_load_keeps_document_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spec.json");
        let raw = r#"{"models": [], "extra_field": {"nested": [1, 2]}, "input_tokens": 5}"#;
        fs::write(&path, raw).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded, serde_json::from_str::<Value>(raw).unwrap());
    }
}
