use comfy_table::{presets, Attribute, Cell, CellAlignment, ContentArrangement, Table};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::config::TableStyle;
use crate::error::{ComparerError, Result};
use crate::models::{CalculateResponse, CompareResponse, CostItem, ModelRecord};

const NOT_AVAILABLE: &str = "N/A";

fn new_table(style: TableStyle) -> Table {
    let mut table = Table::new();
    table.load_preset(match style {
        TableStyle::Ascii => presets::ASCII_FULL,
        TableStyle::Utf8 => presets::UTF8_FULL,
    });
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header(names: &[&str]) -> Vec<Cell> {
    names
        .iter()
        .map(|n| Cell::new(n).add_attribute(Attribute::Bold))
        .collect()
}

fn or_na(s: &str) -> String {
    if s.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        s.to_string()
    }
}

fn opt_cell<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn flag(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "yes",
        Some(false) => "no",
        None => "-",
    }
}

/// Provider / family / name, the `list-models` view.
pub fn models_table(models: &[ModelRecord], style: TableStyle) -> Table {
    let mut table = new_table(style);
    table.set_header(header(&["Provider", "Model Family", "Model Name"]));
    for model in models {
        table.add_row(vec![
            or_na(&model.provider),
            or_na(&model.model_family),
            or_na(&model.model_name),
        ]);
    }
    table
}

/// Full record with limits and capabilities, the `search` view.
pub fn model_details_table(models: &[ModelRecord], style: TableStyle) -> Table {
    let mut table = new_table(style);
    table.set_header(header(&[
        "Provider",
        "Model Family",
        "Model Name",
        "Context",
        "Output",
        "Tools",
        "Multilingual",
        "Audio",
        "Vision",
        "Reasoning",
        "Fine-tuning",
        "Streaming",
    ]));
    for model in models {
        table.add_row(vec![
            Cell::new(or_na(&model.provider)),
            Cell::new(or_na(&model.model_family)),
            Cell::new(or_na(&model.model_name)),
            Cell::new(opt_cell(model.context_window)).set_alignment(CellAlignment::Right),
            Cell::new(opt_cell(model.output_tokens)).set_alignment(CellAlignment::Right),
            Cell::new(flag(model.tools)),
            Cell::new(flag(model.multilingual)),
            Cell::new(flag(model.audio)),
            Cell::new(flag(model.vision)),
            Cell::new(flag(model.reasoning)),
            Cell::new(flag(model.fine_tuning)),
            Cell::new(flag(model.realtime_streaming)),
        ]);
    }
    table
}

/// Two-column name/count table for providers and stats.
pub fn counts_table<V: ToString>(
    rows: &BTreeMap<String, V>,
    key_header: &str,
    count_header: &str,
    style: TableStyle,
) -> Table {
    let mut table = new_table(style);
    table.set_header(header(&[key_header, count_header]));
    for (key, count) in rows {
        table.add_row(vec![
            Cell::new(key),
            Cell::new(count.to_string()).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

/// Stats values are usually integers but shown as sent either way.
pub fn stat_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => NOT_AVAILABLE.to_string(),
        other => other.to_string(),
    }
}

/// Cost items exactly as priced by the server.
pub fn cost_table(items: &[CostItem], style: TableStyle) -> Table {
    let mut table = new_table(style);
    table.set_header(header(&[
        "Provider",
        "Model Family",
        "Model Name",
        "Input Tokens",
        "Output Tokens",
        "Input Price",
        "Output Price",
        "Input Cost",
        "Output Cost",
        "Total Cost",
    ]));
    for item in items {
        table.add_row(vec![
            Cell::new(or_na(&item.provider)),
            Cell::new(or_na(&item.model_family)),
            Cell::new(or_na(&item.model_name)),
            Cell::new(item.input_tokens).set_alignment(CellAlignment::Right),
            Cell::new(item.output_tokens).set_alignment(CellAlignment::Right),
            Cell::new(item.input_price).set_alignment(CellAlignment::Right),
            Cell::new(item.output_price).set_alignment(CellAlignment::Right),
            Cell::new(item.input_cost).set_alignment(CellAlignment::Right),
            Cell::new(item.output_cost).set_alignment(CellAlignment::Right),
            Cell::new(item.total_cost).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

/// Table plus the server's cheapest pick.
pub fn compare_summary(response: &CompareResponse, style: TableStyle) -> String {
    let mut out = cost_table(&response.comparisons, style).to_string();
    out.push('\n');
    match &response.cheapest_option {
        Some(cheapest) => out.push_str(&format!(
            "\nCheapest option: {} (${})",
            cheapest.label(),
            cheapest.total_cost
        )),
        None => out.push_str("\nCheapest option: N/A"),
    }
    if let Some(id) = &response.transaction_id {
        out.push_str(&format!("\nTransaction: {id}"));
    }
    out
}

/// Table plus the server's total.
pub fn calculate_summary(response: &CalculateResponse, style: TableStyle) -> String {
    let mut out = cost_table(&response.calculations, style).to_string();
    out.push('\n');
    out.push_str(&format!("\nTotal cost: ${}", response.total_cost));
    if let Some(id) = &response.transaction_id {
        out.push_str(&format!("\nTransaction: {id}"));
    }
    out
}

/// Pretty JSON, two-space indent, for compare/calculate/search output.
pub fn format_json(value: &Value) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(ComparerError::Serialize)
}

/// Write a listing as CSV with the same columns as the search table.
pub fn export_to_csv(models: &[ModelRecord], filename: &Path) -> Result<()> {
    let output_err = |e: csv::Error| ComparerError::Output {
        path: filename.to_path_buf(),
        message: e.to_string(),
    };

    let mut wtr = csv::Writer::from_path(filename).map_err(output_err)?;

    wtr.write_record([
        "provider",
        "model_family",
        "model_name",
        "context_window",
        "output_tokens",
        "tools",
        "multilingual",
        "audio",
        "vision",
        "reasoning",
        "fine_tuning",
        "realtime_streaming",
    ])
    .map_err(output_err)?;

    let csv_flag = |v: Option<bool>| v.map(|b| b.to_string()).unwrap_or_default();
    for model in models {
        wtr.write_record([
            model.provider.clone(),
            model.model_family.clone(),
            model.model_name.clone(),
            model.context_window.map(|v| v.to_string()).unwrap_or_default(),
            model.output_tokens.map(|v| v.to_string()).unwrap_or_default(),
            csv_flag(model.tools),
            csv_flag(model.multilingual),
            csv_flag(model.audio),
            csv_flag(model.vision),
            csv_flag(model.reasoning),
            csv_flag(model.fine_tuning),
            csv_flag(model.realtime_streaming),
        ])
        .map_err(output_err)?;
    }

    wtr.flush().map_err(|e| ComparerError::Output {
        path: filename.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(())
}
