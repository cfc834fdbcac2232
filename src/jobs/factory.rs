use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::ScrapingError;
use crate::extractor::{Extractor, SiteId, TableExtractor};
use crate::jobs::{Job, JobQueue};

/// Builds the job queue for a run from the configured sites and page ranges.
pub struct JobFactory {
    extractors: HashMap<SiteId, Arc<dyn Extractor>>,
}

impl JobFactory {
    pub fn new() -> Result<Self, ScrapingError> {
        let mut extractors: HashMap<SiteId, Arc<dyn Extractor>> = HashMap::new();
        for site in SiteId::all() {
            extractors.insert(*site, Arc::new(TableExtractor::new(*site)?));
        }
        Ok(Self { extractors })
    }

    /// Replace the extractor used for `extractor.site()`.
    pub fn with_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractors.insert(extractor.site(), extractor);
        self
    }

    /// One job per (site, page), in construction order: proxy360, proxyru,
    /// kuai, then xici. Sites missing from `config.sites` are left out.
    pub fn build(&self, config: &Config) -> JobQueue {
        let mut queue = JobQueue::new(config.pop_order);

        for site in SiteId::all() {
            if !config.runs_site(*site) {
                debug!("Site {} not selected, no jobs built", site);
                continue;
            }
            let Some(extractor) = self.extractors.get(site) else {
                continue;
            };

            let pages = match site {
                SiteId::Proxy360 => None,
                SiteId::Proxyru => Some(config.page_ranges.proxyru),
                SiteId::Kuai => Some(config.page_ranges.kuai),
                SiteId::Xici => Some(config.page_ranges.xici),
            };

            match pages {
                None => {
                    let url = site.page_url(1, &config.xici_category);
                    queue.push(Job::new(*site, None, url, extractor.clone()));
                }
                Some(range) => {
                    for page in range.pages() {
                        let url = site.page_url(page, &config.xici_category);
                        queue.push(Job::new(*site, Some(page), url, extractor.clone()));
                    }
                }
            }
        }

        info!("Built {} jobs ({:?} order)", queue.len(), queue.order());
        queue
    }
}
