//! Nutrition facts table extraction
//!
//! A food page carries one primary facts table. Each cell is matched against
//! an ordered list of label prefixes; the first prefix that matches claims the
//! cell and the first number in it becomes that nutrient's value. Later cells
//! overwrite earlier ones for the same nutrient.

use std::collections::BTreeMap;
use std::fmt;

use scraper::Html;
use serde::{Deserialize, Serialize};

use crate::config::SiteConfig;
use crate::error::Result;
use crate::fetch::{Endpoints, PageSource};
use crate::html::{cell_text, selector, visible_text};
use crate::value::{parse_value, Quantity, GRAM, KCAL};

/// The nutrients this crate extracts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NutrientLabel {
    Calories,
    Fat,
    Carbohydrates,
    Protein,
}

impl NutrientLabel {
    pub const ALL: [NutrientLabel; 4] = [
        NutrientLabel::Calories,
        NutrientLabel::Fat,
        NutrientLabel::Carbohydrates,
        NutrientLabel::Protein,
    ];

    /// Unit attached to values read from the facts table
    pub fn unit(self) -> &'static str {
        match self {
            NutrientLabel::Calories => KCAL,
            _ => GRAM,
        }
    }

    /// Name as printed on the upstream site
    pub fn display_name(self) -> &'static str {
        match self {
            NutrientLabel::Calories => "Kalori",
            NutrientLabel::Fat => "Lemak",
            NutrientLabel::Carbohydrates => "Karbohidrat",
            NutrientLabel::Protein => "Protein",
        }
    }
}

impl fmt::Display for NutrientLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Cell prefixes in priority order. Matching is case-sensitive and stops at
/// the first hit, so order matters for cells that could match several.
pub const LABEL_PREFIXES: [(&str, NutrientLabel); 4] = [
    ("Kal", NutrientLabel::Calories),
    ("Lemak", NutrientLabel::Fat),
    ("Karb", NutrientLabel::Carbohydrates),
    ("Prot", NutrientLabel::Protein),
];

/// Nutrient values keyed by label. Absent nutrients are simply missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NutritionRecord(BTreeMap<NutrientLabel, Quantity>);

impl NutritionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: NutrientLabel, value: Quantity) {
        self.0.insert(label, value);
    }

    pub fn get(&self, label: NutrientLabel) -> Option<&Quantity> {
        self.0.get(&label)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NutrientLabel, &Quantity)> {
        self.0.iter().map(|(label, value)| (*label, value))
    }
}

/// What a food page says: its facts and the serving they are rendered for
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactsPage {
    pub record: NutritionRecord,
    /// Selected serving text, e.g. "1 mangkok (220 g)". `None` means unknown.
    pub serving: Option<String>,
}

impl FactsPage {
    /// A page without recognizable facts is a miss, not an error
    pub fn into_lookup(self) -> Lookup<FactsPage> {
        if self.record.is_empty() {
            Lookup::NotFound
        } else {
            Lookup::Found(self)
        }
    }
}

/// Outcome of looking something up upstream when the fetch itself succeeded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }
}

/// Match one cell against the label prefixes
fn classify_cell(text: &str) -> Option<(NutrientLabel, Option<Quantity>)> {
    LABEL_PREFIXES
        .iter()
        .find(|(prefix, _)| text.starts_with(prefix))
        .map(|(_, label)| (*label, parse_value(text, label.unit())))
}

/// Parse the facts table and selected serving out of a food page
pub fn parse_facts(html: &str, site: &SiteConfig) -> Result<FactsPage> {
    let facts_sel = selector(&site.facts_table)?;
    let cell_sel = selector("td")?;
    let tables_sel = selector(&site.portion_tables)?;
    let selected_sel = selector(&site.selected_row)?;

    let document = Html::parse_document(html);
    let mut record = NutritionRecord::new();

    if let Some(table) = document.select(&facts_sel).next() {
        for cell in table.select(&cell_sel) {
            let text = cell_text(&cell);
            if let Some((label, Some(value))) = classify_cell(&text) {
                record.insert(label, value);
            }
        }
    }

    let serving = document
        .select(&tables_sel)
        .filter(|table| !facts_sel.matches(table))
        .flat_map(|table| table.select(&selected_sel).collect::<Vec<_>>())
        .map(|row| visible_text(&row))
        .find(|text| !text.is_empty());

    Ok(FactsPage { record, serving })
}

/// Fetch a food page (optionally scaled to a serving) and parse its facts
pub fn fetch_facts(
    source: &dyn PageSource,
    endpoints: &Endpoints,
    site: &SiteConfig,
    slug: &str,
    query_suffix: &str,
) -> Result<FactsPage> {
    let url = endpoints.food_url(slug, query_suffix);
    let html = source.fetch_page(&url)?;
    let page = parse_facts(&html, site)?;
    tracing::debug!(
        url = %url,
        nutrients = page.record.len(),
        serving = ?page.serving,
        "parsed facts table"
    );
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts_html(cells: &[&str]) -> String {
        let cells: String = cells.iter().map(|c| format!("<td>{}</td>", c)).collect();
        format!(
            r#"<html><body>
<table class="generic spaced"><tr>{}</tr></table>
<table class="generic"><tr><td><a href="?portionid=1">100 gram</a></td></tr>
<tr class="selected"><td>1 mangkok</td><td>(220 g)</td></tr></table>
</body></html>"#,
            cells
        )
    }

    #[test]
    fn test_parse_all_four_nutrients() {
        let html = facts_html(&["Kal<b>237</b>", "Lemak: 13,49g", "Karb: 10,76g", "Prot: 20,1g"]);
        let page = parse_facts(&html, &SiteConfig::default()).unwrap();
        assert_eq!(page.record.len(), 4);
        assert_eq!(page.record.get(NutrientLabel::Calories), Some(&Quantity::new(237.0, "kcal")));
        assert_eq!(page.record.get(NutrientLabel::Fat), Some(&Quantity::new(13.49, "g")));
        assert_eq!(page.record.get(NutrientLabel::Carbohydrates), Some(&Quantity::new(10.76, "g")));
        assert_eq!(page.record.get(NutrientLabel::Protein), Some(&Quantity::new(20.1, "g")));
        assert_eq!(page.serving.as_deref(), Some("1 mangkok (220 g)"));
        let order: Vec<NutrientLabel> = page.record.iter().map(|(label, _)| label).collect();
        assert_eq!(order, NutrientLabel::ALL.to_vec());
    }

    #[test]
    fn test_last_matching_cell_wins() {
        let html = facts_html(&["Kal 100", "Kal 250"]);
        let page = parse_facts(&html, &SiteConfig::default()).unwrap();
        assert_eq!(page.record.get(NutrientLabel::Calories).unwrap().magnitude, 250.0);
    }

    #[test]
    fn test_cell_without_number_keeps_earlier_value() {
        let html = facts_html(&["Lemak 3", "Lemak"]);
        let page = parse_facts(&html, &SiteConfig::default()).unwrap();
        assert_eq!(page.record.get(NutrientLabel::Fat).unwrap().magnitude, 3.0);
    }

    #[test]
    fn test_prefix_match_is_case_sensitive() {
        let html = facts_html(&["kalori 90", "PROTEIN 4"]);
        let page = parse_facts(&html, &SiteConfig::default()).unwrap();
        assert!(page.record.is_empty());
    }

    #[test]
    fn test_prefix_order() {
        assert_eq!(LABEL_PREFIXES[0].1, NutrientLabel::Calories);
        assert_eq!(LABEL_PREFIXES[3].1, NutrientLabel::Protein);
        assert_eq!(classify_cell("Karbohidrat 5").map(|(l, _)| l), Some(NutrientLabel::Carbohydrates));
        assert_eq!(classify_cell("Serat 5"), None);
    }

    #[test]
    fn test_empty_record_distinct_from_zero_values() {
        let none = parse_facts(&facts_html(&["Serat 2", "Gula 1"]), &SiteConfig::default()).unwrap();
        let zeros = parse_facts(
            &facts_html(&["Kal 0", "Lemak 0", "Karb 0", "Prot 0"]),
            &SiteConfig::default(),
        )
        .unwrap();

        assert!(none.record.is_empty());
        assert!(!zeros.record.is_empty());
        assert_eq!(zeros.record.len(), 4);
        assert_eq!(none.clone().into_lookup(), Lookup::NotFound);
        assert!(zeros.into_lookup().is_found());
    }

    #[test]
    fn test_missing_table_and_serving() {
        let page = parse_facts("<html><body><p>Tidak ada</p></body></html>", &SiteConfig::default())
            .unwrap();
        assert!(page.record.is_empty());
        assert_eq!(page.serving, None);
    }

    #[test]
    fn test_record_serializes_as_map() {
        let mut record = NutritionRecord::new();
        record.insert(NutrientLabel::Protein, Quantity::new(4.0, "g"));
        record.insert(NutrientLabel::Calories, Quantity::new(90.0, "kcal"));
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"calories":{"magnitude":90.0,"unit":"kcal"},"protein":{"magnitude":4.0,"unit":"g"}}"#
        );
    }
}
