//! Search result listing parsing
//!
//! Each search hit carries a prose description such as
//! `Per 100g - Kalori: 237kkal | Lemak: 13,49g | Karb: 10,76g | Prot: 20,1g
//! Ukuran Lainnya: 1 mangkok - 320kkal, ...`. The description is cleaned, then
//! mined for a per-100-gram base record and for alternate serving hints, so a
//! listing is useful without fetching every food page.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use scraper::Html;
use serde::{Deserialize, Serialize};

use crate::config::SiteConfig;
use crate::error::Result;
use crate::fetch::{Endpoints, PageSource};
use crate::html::{collapse_whitespace, selector, visible_text};
use crate::nutrition::{NutrientLabel, NutritionRecord};
use crate::value::{normalize_units, parse_quantity, Quantity};

/// Marker that introduces alternate serving sizes
pub const OTHER_SIZES_MARKER: &str = "Ukuran Lainnya";

/// "see more" link text and everything after it
static SEE_MORE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)\blagi\b.*$").expect("Invalid see-more regex")
});

/// "Nutrition Information" link text and everything after it
static NUTRITION_INFO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)\binformasi gizi\b.*$").expect("Invalid nutrition-info regex")
});

/// "- Similar" suggestions and everything after them
static SIMILAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)-\s*serupa\b.*$").expect("Invalid similar regex")
});

static SEPARATOR_RUN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\s,;\-]{2,}").expect("Invalid separator regex")
});

/// Separators allowed between the fields of the per-100g phrase
const FIELD_SEP: &str = r"[\s,;|\-]*";

/// A unit-bearing value inside a description
const VALUE: &str = r"(\d+(?:[.,]\d+)?\s*(?:kcal|gram|gr|g))\b";

static STRICT_RE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?i)per\s*100\s*(?:gram|gr|g)\b{sep}Kalori\s*:?\s*{v}{sep}Lemak\s*:?\s*{v}{sep}Karb(?:ohidrat)?\s*:?\s*{v}{sep}Prot(?:ein)?\s*:?\s*{v}",
        sep = FIELD_SEP,
        v = VALUE,
    );
    Regex::new(&pattern).expect("Invalid strict description regex")
});

static FALLBACK_RES: Lazy<Vec<(NutrientLabel, Regex)>> = Lazy::new(|| {
    [
        (NutrientLabel::Calories, r"Kalori"),
        (NutrientLabel::Fat, r"Lemak"),
        (NutrientLabel::Carbohydrates, r"Karb(?:ohidrat)?"),
        (NutrientLabel::Protein, r"Prot(?:ein)?"),
    ]
    .into_iter()
    .map(|(label, name)| {
        let pattern = format!(r"(?i)\b{}\s*:?\s*{}", name, VALUE);
        (label, Regex::new(&pattern).expect("Invalid fallback description regex"))
    })
    .collect()
});

/// One serving hint at the start of the text, after an optional separator.
/// The label runs up to the first ` - <number> kcal`, colons included.
static ALTERNATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*[:,;|]?\s*(.+?)\s+-\s+(\d+(?:[.,]\d+)?\s*kcal)\b")
        .expect("Invalid alternate serving regex")
});

/// Calorie hint for a serving size mentioned in a description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortionHint {
    pub label: String,
    /// As written after normalization, e.g. "320 kcal"
    pub calories: String,
}

impl PortionHint {
    pub fn quantity(&self) -> Option<Quantity> {
        parse_quantity(&self.calories)
    }
}

/// One row of a search listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub name: String,
    /// Cleaned description; present even when nothing structured was recovered
    pub description: String,
    /// Per-100-gram facts recovered from the description
    pub base: NutritionRecord,
    pub alternates: Vec<PortionHint>,
}

impl SearchResultItem {
    /// Build an item from a listing's name and raw description text
    pub fn from_listing(name: &str, raw_description: &str) -> Self {
        let description = clean_description(raw_description);
        let base = extract_base_record(&description);
        let alternates = extract_alternates(&description);
        Self {
            name: collapse_whitespace(name),
            description,
            base,
            alternates,
        }
    }
}

/// Cut the trailing "see more" and "nutrition information" link texts
fn strip_trailing_links(text: &str) -> String {
    let text = SEE_MORE_RE.replace(text, "");
    NUTRITION_INFO_RE.replace(&text, "").into_owned()
}

/// Collapse separator runs holding two or more punctuation separators.
///
/// A lone `, ` or ` - ` survives: serving labels and calorie hints rely on them.
fn collapse_separator_runs(text: &str) -> String {
    SEPARATOR_RUN_RE
        .replace_all(text, |caps: &Captures| {
            let run = &caps[0];
            let punctuation = run.chars().filter(|c| matches!(c, ',' | ';' | '-')).count();
            if punctuation >= 2 {
                " ".to_string()
            } else {
                run.to_string()
            }
        })
        .into_owned()
}

fn trim_separators(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '-'))
}

/// Clean a raw listing description
pub fn clean_description(raw: &str) -> String {
    let text = collapse_whitespace(raw);
    let text = strip_trailing_links(&text);
    let text = SIMILAR_RE.replace(&text, "");
    let text = collapse_separator_runs(&text);
    let text = trim_separators(&text);
    normalize_units(text)
}

/// All four nutrients from the anchored per-100-gram phrase, or nothing
pub fn match_strict(text: &str) -> Option<NutritionRecord> {
    let caps = STRICT_RE.captures(text)?;
    let mut record = NutritionRecord::new();
    for (index, label) in NutrientLabel::ALL.into_iter().enumerate() {
        let value = parse_quantity(caps.get(index + 1)?.as_str())?;
        record.insert(label, value);
    }
    Some(record)
}

/// Each nutrient searched independently; missing ones stay absent
pub fn match_fallback(text: &str) -> NutritionRecord {
    let mut record = NutritionRecord::new();
    for (label, re) in FALLBACK_RES.iter() {
        let value = re
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| parse_quantity(m.as_str()));
        if let Some(value) = value {
            record.insert(*label, value);
        }
    }
    record
}

/// Base record from a cleaned description: strict phrase first, per-field search second
pub fn extract_base_record(text: &str) -> NutritionRecord {
    match match_strict(text) {
        Some(record) => record,
        None => match_fallback(text),
    }
}

/// Serving hints listed after the "Ukuran Lainnya" marker
pub fn extract_alternates(text: &str) -> Vec<PortionHint> {
    let Some(position) = text.find(OTHER_SIZES_MARKER) else {
        return Vec::new();
    };
    let remainder = strip_trailing_links(&text[position + OTHER_SIZES_MARKER.len()..]);

    // Hints are chained: each one starts where the previous one's kcal ended
    let mut hints = Vec::new();
    let mut rest = remainder.as_str();
    while let Some(caps) = ALTERNATE_RE.captures(rest) {
        let label = trim_separators(&caps[1]);
        if !label.is_empty() {
            hints.push(PortionHint {
                label: label.to_string(),
                calories: caps[2].to_string(),
            });
        }
        let end = caps.get(0).map_or(rest.len(), |m| m.end());
        rest = &rest[end..];
    }
    hints
}

/// Parse a search results page. No results table means no results.
pub fn parse_results(html: &str, site: &SiteConfig) -> Result<Vec<SearchResultItem>> {
    let table_sel = selector(&site.results_table)?;
    let row_sel = selector("tr")?;
    let link_sel = selector("a")?;
    let description_sel = selector(&site.result_description)?;

    let document = Html::parse_document(html);
    let Some(table) = document.select(&table_sel).next() else {
        return Ok(Vec::new());
    };

    let items = table
        .select(&row_sel)
        .filter_map(|row| {
            let name = row.select(&link_sel).next().map(|a| visible_text(&a))?;
            if name.is_empty() {
                return None;
            }
            let raw_description = row
                .select(&description_sel)
                .next()
                .map(|el| visible_text(&el))
                .unwrap_or_default();
            Some(SearchResultItem::from_listing(&name, &raw_description))
        })
        .collect();

    Ok(items)
}

/// Run a search and parse the listing. Any failure yields no results.
pub fn search(
    source: &dyn PageSource,
    endpoints: &Endpoints,
    site: &SiteConfig,
    slug: &str,
) -> Vec<SearchResultItem> {
    let url = endpoints.search_url(slug);
    let items = source
        .fetch_page(&url)
        .and_then(|html| parse_results(&html, site));

    match items {
        Ok(items) => {
            tracing::debug!(url = %url, count = items.len(), "parsed search results");
            items
        }
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "search failed");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_description_drops_see_more() {
        let cleaned =
            clean_description("Per 100 gram - Kalori: 237kkal, Lemak: 13,49g, ... , lagi");
        assert!(!cleaned.contains("lagi"));
        assert!(cleaned.contains("237 kcal"));
        assert!(cleaned.contains("13,49 g"));
        assert!(cleaned.starts_with("Per 100 gram - Kalori"));
    }

    #[test]
    fn test_clean_description_pipeline_order() {
        let raw = "  Per 100g\n - Kalori: 90kkal ;; Lemak: 1g  Informasi Gizi untuk Tahu - Serupa: Tempe ";
        let cleaned = clean_description(raw);
        assert_eq!(cleaned, "Per 100 g - Kalori: 90 kcal Lemak: 1 g");
    }

    #[test]
    fn test_clean_description_strips_similar() {
        assert_eq!(clean_description("Kalori: 50kkal - Serupa Tahu Goreng"), "Kalori: 50 kcal");
    }

    #[test]
    fn test_collapse_separator_runs_keeps_single_separators() {
        assert_eq!(collapse_separator_runs("a, b - c"), "a, b - c");
        assert_eq!(collapse_separator_runs("a, , b -- c"), "a b c");
    }

    #[test]
    fn test_strict_tier() {
        let text = clean_description(
            "Per 100 gram - Kalori: 237kkal | Lemak: 13,49g | Karb: 10,76g | Prot: 20,1g",
        );
        let record = match_strict(&text).expect("strict pattern should match");
        assert_eq!(record.len(), 4);
        assert_eq!(record.get(NutrientLabel::Calories), Some(&Quantity::new(237.0, "kcal")));
        assert_eq!(record.get(NutrientLabel::Fat), Some(&Quantity::new(13.49, "g")));
        assert_eq!(record.get(NutrientLabel::Carbohydrates), Some(&Quantity::new(10.76, "g")));
        assert_eq!(record.get(NutrientLabel::Protein), Some(&Quantity::new(20.1, "g")));
    }

    #[test]
    fn test_strict_tier_with_full_names_and_commas() {
        let text = clean_description(
            "per 100 gr - Kalori: 52kkal, Lemak: 0,17g, Karbohidrat: 13,81g, Protein: 0,26g",
        );
        let record = match_strict(&text).unwrap();
        assert_eq!(record.get(NutrientLabel::Protein).unwrap().magnitude, 0.26);
    }

    #[test]
    fn test_fallback_tier_partial() {
        let text = clean_description("Kalori: 90 kcal");
        assert!(match_strict(&text).is_none());
        let record = extract_base_record(&text);
        assert_eq!(record.len(), 1);
        assert_eq!(record.get(NutrientLabel::Calories), Some(&Quantity::new(90.0, "kcal")));
    }

    #[test]
    fn test_fallback_tier_out_of_order() {
        let record = extract_base_record("Protein: 3 g, Kalori: 40 kcal");
        assert_eq!(record.len(), 2);
        assert_eq!(record.get(NutrientLabel::Protein).unwrap().magnitude, 3.0);
    }

    #[test]
    fn test_no_structure_yields_empty_record() {
        assert!(extract_base_record("Makanan khas daerah").is_empty());
    }

    #[test]
    fn test_alternates() {
        let text = clean_description(
            "Ukuran Lainnya: 1 mangkok, dimasak - 320kkal, 1 potong - 45kkal",
        );
        let hints = extract_alternates(&text);
        assert_eq!(
            hints,
            vec![
                PortionHint { label: "1 mangkok, dimasak".into(), calories: "320 kcal".into() },
                PortionHint { label: "1 potong".into(), calories: "45 kcal".into() },
            ]
        );
        assert_eq!(hints[1].quantity(), Some(Quantity::new(45.0, "kcal")));
    }

    #[test]
    fn test_alternates_after_base_facts() {
        let text = clean_description(
            "Per 100g - Kalori: 237kkal | Lemak: 13,49g | Karb: 10,76g | Prot: 20,1g Ukuran Lainnya: 1 porsi - 474kkal, lagi...",
        );
        let hints = extract_alternates(&text);
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].label, "1 porsi");
        assert_eq!(extract_base_record(&text).len(), 4);
    }

    #[test]
    fn test_alternate_label_keeps_colon() {
        let text = clean_description(
            "Per 100g - Kalori: 90kkal Ukuran Lainnya: 1 porsi (Porsi: besar) - 474kkal, 1 gelas - 90kkal",
        );
        assert_eq!(
            extract_alternates(&text),
            vec![
                PortionHint { label: "1 porsi (Porsi: besar)".into(), calories: "474 kcal".into() },
                PortionHint { label: "1 gelas".into(), calories: "90 kcal".into() },
            ]
        );
    }

    #[test]
    fn test_alternates_stop_at_trailing_text() {
        let text = clean_description("Ukuran Lainnya: 1 potong - 45kkal, tanpa kalori");
        let hints = extract_alternates(&text);
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].label, "1 potong");
    }

    #[test]
    fn test_no_alternates_without_marker() {
        assert!(extract_alternates("1 potong - 45 kcal").is_empty());
    }

    #[test]
    fn test_parse_results() {
        let html = r#"<html><body>
<table class="generic searchResult">
  <tr><td>
    <a class="prominent" href="/kalori-gizi/umum/sate-ayam">Sate Ayam</a>
    <div class="smallText greyText greyLink">
      Per 100g - Kalori: 225kkal | Lemak: 12,69g | Karb: 5,11g | Prot: 22,62g
      <a href="/x">Informasi Gizi</a>
    </div>
  </td></tr>
  <tr><td>
    <a class="prominent" href="/kalori-gizi/umum/sate-kambing">Sate Kambing</a>
    <div class="smallText">Hidangan populer</div>
  </td></tr>
  <tr><td>tanpa tautan</td></tr>
</table>
</body></html>"#;
        let items = parse_results(html, &SiteConfig::default()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Sate Ayam");
        assert_eq!(items[0].base.len(), 4);
        assert!(!items[0].description.contains("Informasi"));
        assert_eq!(items[1].name, "Sate Kambing");
        assert_eq!(items[1].description, "Hidangan populer");
        assert!(items[1].base.is_empty());
        assert!(items[1].alternates.is_empty());
    }

    #[test]
    fn test_parse_results_without_table() {
        let items = parse_results("<html><body>Tidak ditemukan</body></html>", &SiteConfig::default())
            .unwrap();
        assert!(items.is_empty());
    }
}
