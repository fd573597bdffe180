//! Small markup helpers shared by the scrapers

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};

use crate::error::{GiziError, Result};

/// Precompiled regex for collapsing whitespace
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("Invalid whitespace regex")
});

/// Compile a configured CSS selector
pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| GiziError::ConfigError(format!("Invalid selector '{}': {:?}", css, e)))
}

/// Text of an element with every text node trimmed and glued together.
///
/// `<td><b>Kal</b> 237 kkal</td>` becomes `Kal237 kkal`.
pub fn cell_text(element: &ElementRef) -> String {
    element.text().map(str::trim).collect()
}

/// Text of an element as a reader would see it: nodes joined by spaces, whitespace collapsed
pub fn visible_text(element: &ElementRef) -> String {
    let text = element.text().collect::<Vec<_>>().join(" ");
    collapse_whitespace(&text)
}

/// Collapse whitespace runs to a single space and trim
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}
