//! Public entry point tying the scrapers to a page source and configuration

use crate::config::Config;
use crate::error::Result;
use crate::fetch::{Endpoints, HttpSource, PageSource};
use crate::nutrition::{fetch_facts, FactsPage, Lookup};
use crate::portion::{self, PortionNutrition, ServingSize};
use crate::search::{self, SearchResultItem};
use crate::slug::slugify;

/// Nutrition lookups against one upstream site.
///
/// Holds no mutable state; every call fetches fresh pages and is safe to run
/// concurrently from several threads.
pub struct NutritionClient<S: PageSource = HttpSource> {
    source: S,
    config: Config,
    endpoints: Endpoints,
}

impl NutritionClient<HttpSource> {
    /// Client talking to the live site described by `config`
    pub fn from_config(config: Config) -> Self {
        let source = HttpSource::new(&config.http);
        Self::with_source(source, config)
    }
}

impl<S: PageSource> NutritionClient<S> {
    pub fn with_source(source: S, config: Config) -> Self {
        let endpoints = Endpoints::new(&config.site);
        Self {
            source,
            config,
            endpoints,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Facts for a food at its default serving.
    ///
    /// An empty record means the page had no facts table. Fetch failures are errors.
    pub fn fetch_nutrition(&self, name: &str) -> Result<FactsPage> {
        let slug = slugify(name)?;
        self.fetch_nutrition_slug(&slug, "")
    }

    /// Facts for an already-slugged food, scaled by a serving query fragment
    pub fn fetch_nutrition_slug(&self, slug: &str, query_suffix: &str) -> Result<FactsPage> {
        fetch_facts(
            &self.source,
            &self.endpoints,
            &self.config.site,
            slug,
            query_suffix,
        )
    }

    /// Like [`fetch_nutrition`](Self::fetch_nutrition) but with "not found" spelled out
    pub fn lookup(&self, name: &str) -> Result<Lookup<FactsPage>> {
        let page = self.fetch_nutrition(name)?;
        let lookup = page.into_lookup();
        if !lookup.is_found() {
            tracing::info!(name, "no facts table for food");
        }
        Ok(lookup)
    }

    /// Serving sizes offered for a food; empty when none are found or the page fails
    pub fn list_portions(&self, name: &str) -> Result<Vec<ServingSize>> {
        let slug = slugify(name)?;
        Ok(self.portions_for_slug(&slug))
    }

    fn portions_for_slug(&self, slug: &str) -> Vec<ServingSize> {
        portion::list_portions(
            &self.source,
            &self.endpoints,
            &self.config.site,
            &self.config.portions.labels,
            slug,
        )
    }

    /// Nutrition for every discovered serving size, in discovery order
    pub fn aggregate_portions(&self, name: &str) -> Result<Vec<PortionNutrition>> {
        let slug = slugify(name)?;
        let servings = self.portions_for_slug(&slug);
        let portions = portion::aggregate(
            &self.source,
            &self.endpoints,
            &self.config.site,
            &slug,
            servings,
            self.config.portions.workers(),
        );
        tracing::info!(
            name,
            servings = portions.len(),
            failed = portions.iter().filter(|p| p.error.is_some()).count(),
            "aggregated serving sizes"
        );
        Ok(portions)
    }

    /// Search listing with best-effort nutrition pulled from each description
    pub fn search(&self, query: &str) -> Result<Vec<SearchResultItem>> {
        let slug = slugify(query)?;
        Ok(search::search(
            &self.source,
            &self.endpoints,
            &self.config.site,
            &slug,
        ))
    }
}
