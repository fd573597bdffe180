//! Serving-size discovery and per-serving nutrition
//!
//! A food page links to re-rendered versions of itself for each serving size
//! ("1 mangkok", "1 porsi", ...). Only the query string of those links matters:
//! appended to the food URL it scales the facts table to that serving.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use scraper::Html;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::SiteConfig;
use crate::error::Result;
use crate::fetch::{Endpoints, PageSource};
use crate::html::{cell_text, selector};
use crate::nutrition::{fetch_facts, FactsPage, NutritionRecord};

/// A named serving size and the query fragment that renders it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServingSize {
    pub label: String,
    /// Appended verbatim to the food URL, e.g. `?portionid=59&portionamount=1.000`
    pub query: String,
}

/// Nutrition for one serving size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortionNutrition {
    pub serving: ServingSize,
    pub record: NutritionRecord,
    /// Serving text the page reported as selected, e.g. "1 mangkok (220 g)"
    pub serving_text: Option<String>,
    /// Set when this serving's page could not be fetched; `record` is then empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PortionNutrition {
    fn from_page(serving: ServingSize, page: FactsPage) -> Self {
        Self {
            serving,
            record: page.record,
            serving_text: page.serving,
            error: None,
        }
    }

    fn failed(serving: ServingSize, error: String) -> Self {
        Self {
            serving,
            record: NutritionRecord::new(),
            serving_text: None,
            error: Some(error),
        }
    }
}

/// Find serving-size links whose text is one of `labels`.
///
/// First occurrence of a label wins; links with any other text are ignored.
pub fn parse_portion_links(
    html: &str,
    site: &SiteConfig,
    base_url: &str,
    labels: &[String],
) -> Result<Vec<ServingSize>> {
    let tables_sel = selector(&site.portion_tables)?;
    let link_sel = selector("a[href]")?;
    let base = Url::parse(base_url)?;

    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut servings = Vec::new();

    for table in document.select(&tables_sel) {
        for link in table.select(&link_sel) {
            let text = cell_text(&link);
            if !labels.iter().any(|label| *label == text) || seen.contains(&text) {
                continue;
            }

            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let query = match base.join(href) {
                Ok(resolved) => format!("?{}", resolved.query().unwrap_or("")),
                Err(e) => {
                    tracing::debug!(href, error = %e, "skipping unparseable serving link");
                    continue;
                }
            };

            seen.insert(text.clone());
            servings.push(ServingSize { label: text, query });
        }
    }

    Ok(servings)
}

/// Discover serving sizes for a food. Failures are logged and yield no servings.
pub fn list_portions(
    source: &dyn PageSource,
    endpoints: &Endpoints,
    site: &SiteConfig,
    labels: &[String],
    slug: &str,
) -> Vec<ServingSize> {
    let url = endpoints.food_url(slug, "");
    let servings = source
        .fetch_page(&url)
        .and_then(|html| parse_portion_links(&html, site, endpoints.base_url(), labels));

    match servings {
        Ok(servings) => {
            tracing::debug!(url = %url, count = servings.len(), "discovered serving sizes");
            servings
        }
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "serving discovery failed");
            Vec::new()
        }
    }
}

/// Fetch the facts for every serving on a bounded pool of worker threads.
///
/// Output order follows `servings`. A serving whose fetch fails stays in the
/// output with an empty record and its error message.
pub fn aggregate(
    source: &dyn PageSource,
    endpoints: &Endpoints,
    site: &SiteConfig,
    slug: &str,
    servings: Vec<ServingSize>,
    workers: usize,
) -> Vec<PortionNutrition> {
    if servings.is_empty() {
        return Vec::new();
    }

    let workers = workers.clamp(1, servings.len());
    let next = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<(usize, Result<FactsPage>)>();

    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let next = &next;
            let servings = &servings;
            scope.spawn(move || loop {
                let index = next.fetch_add(1, Ordering::Relaxed);
                let Some(serving) = servings.get(index) else {
                    break;
                };
                let result = fetch_facts(source, endpoints, site, slug, &serving.query);
                if tx.send((index, result)).is_err() {
                    break;
                }
            });
        }
    });
    drop(tx);

    let mut slots: Vec<Option<Result<FactsPage>>> = servings.iter().map(|_| None).collect();
    for (index, result) in rx {
        slots[index] = Some(result);
    }

    servings
        .into_iter()
        .zip(slots)
        .map(|(serving, slot)| match slot {
            Some(Ok(page)) => PortionNutrition::from_page(serving, page),
            Some(Err(e)) => {
                tracing::warn!(slug, serving = %serving.label, error = %e, "serving fetch failed");
                PortionNutrition::failed(serving, e.to_string())
            }
            None => PortionNutrition::failed(serving, "serving was never fetched".to_string()),
        })
        .collect()
}
