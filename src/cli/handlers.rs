use anyhow::{Context, Result};
use crossterm::style::Stylize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{Cli, Commands, ConfigAction, SearchArgs};
use crate::api_client::ApiClient;
use crate::config::{self, Config};
use crate::error::ComparerError;
use crate::models::{CalculateResponse, CompareResponse, ModelRecord};
use crate::spec_file::{self, SpecKind};
use crate::table_display::{self, format_json};
use crate::trace_command;

/// Everything a handler needs besides its own arguments.
pub struct Session<'a> {
    pub config: &'a Config,
    pub server: Option<&'a str>,
    pub config_file: Option<&'a Path>,
}

impl Session<'_> {
    /// Build an authenticated client. Fails on a missing key before any
    /// connection is attempted.
    pub fn client(&self) -> crate::error::Result<ApiClient> {
        let api_key = config::api_key_from_env()?;
        let base_url = self.config.effective_base_url(self.server);
        tracing::debug!(target: "config", "Using server {}", base_url);
        ApiClient::with_timeout(
            &base_url,
            &api_key,
            self.config.api.timeout_secs.map(Duration::from_secs),
        )
    }

    fn style(&self) -> config::TableStyle {
        self.config.display.table_style
    }
}

/// Dispatch a parsed command line.
pub fn run(cli: &Cli, config: &Config) -> Result<()> {
    let session = Session {
        config,
        server: cli.server.as_deref(),
        config_file: cli.config_file.as_deref(),
    };

    match &cli.command {
        Commands::ListModels { search, export } => {
            trace_command!("list-models");
            list_models(&session, search.as_deref(), export.as_deref())
        }
        Commands::ListProviders => {
            trace_command!("list-providers");
            list_providers(&session)
        }
        Commands::Stats => {
            trace_command!("stats");
            stats(&session)
        }
        Commands::Search(args) => {
            trace_command!("search");
            search(&session, args)
        }
        Commands::Compare {
            spec,
            output,
            summary,
        } => {
            trace_command!("compare");
            compare(&session, spec, output.as_deref(), *summary)
        }
        Commands::Calculate {
            spec,
            output,
            summary,
        } => {
            trace_command!("calculate");
            calculate(&session, spec, output.as_deref(), *summary)
        }
        Commands::SampleSpec { command, output } => {
            trace_command!("sample-spec");
            sample_spec(&session, *command, output.as_deref())
        }
        Commands::Config { action } => config_command(&session, action),
    }
}

pub fn list_models(session: &Session, search: Option<&str>, export: Option<&Path>) -> Result<()> {
    let client = session.client()?;
    let mut models = client.get_models()?;

    let search = search.map(str::trim).filter(|s| !s.is_empty());
    if let Some(needle) = search {
        models.retain(|m| m.matches(needle));
        tracing::debug!(target: "command", "{} models match {:?}", models.len(), needle);
    }

    if models.is_empty() {
        match search {
            Some(needle) => println!(
                "{}",
                format!("No models found matching search: {needle}").yellow()
            ),
            None => println!("{}", "No models available".yellow()),
        }
        return Ok(());
    }

    println!("{}", table_display::models_table(&models, session.style()));
    println!("\n{}", format!("Total models: {}", models.len()).green());

    if let Some(path) = export {
        export_models(&models, path)?;
    }
    Ok(())
}

pub fn list_providers(session: &Session) -> Result<()> {
    let client = session.client()?;
    let providers = client.get_providers()?;

    if providers.is_empty() {
        println!("{}", "No providers available".yellow());
        return Ok(());
    }

    println!(
        "{}",
        table_display::counts_table(&providers, "Provider", "Models", session.style())
    );
    println!("\n{}", format!("Total providers: {}", providers.len()).green());
    Ok(())
}

pub fn stats(session: &Session) -> Result<()> {
    let client = session.client()?;
    let stats = client.get_stats()?;

    if stats.is_empty() {
        println!("{}", "No statistics available".yellow());
        return Ok(());
    }

    let rows: BTreeMap<String, String> = stats
        .iter()
        .map(|(provider, value)| (provider.clone(), table_display::stat_value(value)))
        .collect();
    println!(
        "{}",
        table_display::counts_table(&rows, "Provider", "Model Count", session.style())
    );
    Ok(())
}

/// Pull model records out of a search response.
///
/// The service answers with a bare array; an object wrapping `results` or
/// `models` is accepted too. Anything else returns `None`.
pub fn search_records(response: &Value) -> Option<Vec<ModelRecord>> {
    let list = match response {
        Value::Array(_) => response,
        Value::Object(map) => map.get("results").or_else(|| map.get("models"))?,
        _ => return None,
    };
    serde_json::from_value(list.clone()).ok()
}

pub fn search(session: &Session, args: &SearchArgs) -> Result<()> {
    let criteria = args.criteria();
    criteria.validate().map_err(ComparerError::Usage)?;

    let client = session.client()?;
    let response = client.search_models(criteria)?;

    if args.json {
        println!("{}", format_json(&response)?);
        return Ok(());
    }

    let Some(models) = search_records(&response) else {
        tracing::warn!(target: "command", "Search response is not a model list, printing raw JSON");
        println!("{}", format_json(&response)?);
        return Ok(());
    };

    if models.is_empty() {
        println!("{}", "No models match the search criteria".yellow());
        return Ok(());
    }

    println!(
        "{}",
        table_display::model_details_table(&models, session.style())
    );
    println!("\n{}", format!("Total matches: {}", models.len()).green());

    if let Some(path) = &args.export {
        export_models(&models, path)?;
    }
    Ok(())
}

pub fn compare(session: &Session, spec: &Path, output: Option<&Path>, summary: bool) -> Result<()> {
    let client = session.client()?;
    let body = spec_file::load(spec)?;
    let response = client.compare_models(&body)?;

    if summary {
        let typed: CompareResponse =
            serde_json::from_value(response.clone()).map_err(ComparerError::Decode)?;
        println!("{}", table_display::compare_summary(&typed, session.style()));
        if let Some(path) = output {
            write_output(path, &format_json(&response)?)?;
        }
        return Ok(());
    }

    emit(&format_json(&response)?, output)
}

pub fn calculate(
    session: &Session,
    spec: &Path,
    output: Option<&Path>,
    summary: bool,
) -> Result<()> {
    let client = session.client()?;
    let body = spec_file::load(spec)?;
    let response = client.calculate_price(&body)?;

    if summary {
        let typed: CalculateResponse =
            serde_json::from_value(response.clone()).map_err(ComparerError::Decode)?;
        println!(
            "{}",
            table_display::calculate_summary(&typed, session.style())
        );
        if let Some(path) = output {
            write_output(path, &format_json(&response)?)?;
        }
        return Ok(());
    }

    emit(&format_json(&response)?, output)
}

pub fn sample_spec(session: &Session, kind: SpecKind, output: Option<&Path>) -> Result<()> {
    let client = session.client()?;
    let models = client.get_models()?;
    let sample = spec_file::sample_json(kind, &models, &mut rand::thread_rng())?;
    emit(&sample, output)
}

fn config_command(session: &Session, action: &ConfigAction) -> Result<()> {
    let path = match session.config_file {
        Some(p) => p.to_path_buf(),
        None => Config::get_config_path()?,
    };

    match action {
        ConfigAction::Init { force } => {
            Config::write_default(&path, *force)?;
            println!("Configuration file created at: {}", path.display());
            println!("Edit this file to customize your Comparer CLI experience.");
        }
        ConfigAction::Show => {
            print!("{}", session.config.to_toml()?);
        }
        ConfigAction::Path => {
            println!("{}", path.display());
        }
    }
    Ok(())
}

/// Print to stdout, or write to `output` when given.
fn emit(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => write_output(path, text),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

fn write_output(path: &Path, text: &str) -> Result<()> {
    let mut contents = text.to_string();
    if !contents.ends_with('\n') {
        contents.push('\n');
    }
    fs::write(path, contents).map_err(|e| ComparerError::Output {
        path: PathBuf::from(path),
        message: e.to_string(),
    })?;
    println!("{}", format!("Results written to {}", path.display()).green());
    Ok(())
}

fn export_models(models: &[ModelRecord], path: &Path) -> Result<()> {
    table_display::export_to_csv(models, path)
        .with_context(|| format!("Exporting {} models", models.len()))?;
    println!("{}", format!("Results exported to {}", path.display()).green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_records_from_array() {
        let response = json!([
            {"provider": "together", "model_family": "qwen", "model_name": "qwen-2.5", "context_window": 32768}
        ]);
        let records = search_records(&response).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].context_window, Some(32768));
    }

    #[test]
    fn test_search_records_from_wrapper() {
        let response = json!({"results": [], "count": 0});
        assert_eq!(search_records(&response).unwrap().len(), 0);
    }

    #[test]
    fn test_search_records_rejects_other_shapes() {
        assert!(search_records(&json!({"status": "ok"})).is_none());
        assert!(search_records(&json!("nope")).is_none());
    }
}
