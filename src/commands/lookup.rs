//! Lookup commands: facts, portions, search

use colored::Colorize;

use gizi::config::Config;
use gizi::error::Result;
use gizi::nutrition::Lookup;
use gizi::NutritionClient;

use super::render::{nutrient_lines, print_not_found, print_portion, print_search_item};

fn client() -> Result<NutritionClient> {
    let config = Config::load()?;
    Ok(NutritionClient::from_config(config))
}

/// Show facts for a food at its default serving
pub fn cmd_facts(name: &str, json: bool) -> Result<()> {
    let client = client()?;
    let lookup = client.lookup(name)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&lookup)?);
        return Ok(());
    }

    let display = &client.config().display;
    match lookup {
        Lookup::Found(page) => {
            println!("\n{}", name.bold());
            if let Some(ref serving) = page.serving {
                println!("  {} {}", "Porsi:".dimmed(), serving);
            }
            for line in nutrient_lines(&page.record, display) {
                println!("{}", line);
            }
            println!();
        }
        Lookup::NotFound => print_not_found(name, display),
    }
    Ok(())
}

/// Show facts for every known serving size
pub fn cmd_portions(name: &str, json: bool) -> Result<()> {
    let client = client()?;
    let portions = client.aggregate_portions(name)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&portions)?);
        return Ok(());
    }

    let display = &client.config().display;
    if portions.is_empty() {
        print_not_found(name, display);
        return Ok(());
    }

    println!("\n{} ({} porsi)\n", name.bold(), portions.len());
    for portion in &portions {
        print_portion(portion, display);
    }
    println!();
    Ok(())
}

/// Search the listing and show parsed nutrition
pub fn cmd_search(query: &str, limit: Option<usize>, json: bool) -> Result<()> {
    let client = client()?;
    let mut items = client.search(query)?;
    if let Some(limit) = limit {
        items.truncate(limit);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    let display = &client.config().display;
    if items.is_empty() {
        print_not_found(query, display);
        return Ok(());
    }

    println!();
    for (index, item) in items.iter().enumerate() {
        print_search_item(index, item, display);
        println!();
    }
    Ok(())
}
