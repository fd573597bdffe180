//! Terminal presentation of scraped records
//!
//! Zero-filling of absent nutrients and the "not registered" wording live
//! here, driven by `DisplayConfig`; the library never applies them.

use colored::Colorize;

use gizi::config::DisplayConfig;
use gizi::nutrition::{NutrientLabel, NutritionRecord};
use gizi::portion::PortionNutrition;
use gizi::search::SearchResultItem;

/// Value shown for one nutrient, or `None` when it should be left out
pub fn nutrient_value(
    record: &NutritionRecord,
    label: NutrientLabel,
    display: &DisplayConfig,
) -> Option<String> {
    match record.get(label) {
        Some(value) => Some(value.to_string()),
        None if display.fill_missing => Some(format!("0 {}", label.unit())),
        None => None,
    }
}

/// One indented line per nutrient
pub fn nutrient_lines(record: &NutritionRecord, display: &DisplayConfig) -> Vec<String> {
    NutrientLabel::ALL
        .iter()
        .filter_map(|label| {
            nutrient_value(record, *label, display)
                .map(|value| format!("    {:<12} {}", label.display_name(), value))
        })
        .collect()
}

pub fn print_not_found(name: &str, display: &DisplayConfig) {
    println!("{} {}", display.not_found_message.yellow(), format!("({})", name).dimmed());
}

pub fn print_portion(portion: &PortionNutrition, display: &DisplayConfig) {
    let serving = portion
        .serving_text
        .as_deref()
        .unwrap_or(portion.serving.label.as_str());
    println!("  {} {}", portion.serving.label.bold(), format!("[{}]", serving).dimmed());

    if let Some(ref error) = portion.error {
        println!("    {} {}", "fetch failed:".red(), error);
    } else if portion.record.is_empty() {
        println!("    {}", display.not_found_message.yellow());
    } else {
        for line in nutrient_lines(&portion.record, display) {
            println!("{}", line);
        }
    }
}

pub fn print_search_item(index: usize, item: &SearchResultItem, display: &DisplayConfig) {
    println!("{}. {}", index + 1, item.name.bold());
    if !item.description.is_empty() {
        println!("    {}", item.description.dimmed());
    }

    if !item.base.is_empty() {
        println!("    {}", "Per 100 g:".cyan());
        for line in nutrient_lines(&item.base, display) {
            println!("  {}", line);
        }
    }

    if !item.alternates.is_empty() {
        println!("    {}", "Ukuran lain:".cyan());
        for hint in &item.alternates {
            println!("      {:<24} {}", hint.label, hint.calories);
        }
    }
}
