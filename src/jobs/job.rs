use std::fmt;
use std::sync::Arc;

use crate::extractor::{Extractor, SiteId};

/// One (site, page) scraping unit. Built once, run once.
pub struct Job {
    site: SiteId,
    page: Option<u32>,
    url: String,
    extractor: Arc<dyn Extractor>,
}

impl Job {
    pub fn new(site: SiteId, page: Option<u32>, url: impl Into<String>, extractor: Arc<dyn Extractor>) -> Self {
        Self {
            site,
            page,
            url: url.into(),
            extractor,
        }
    }

    pub fn site(&self) -> SiteId {
        self.site
    }

    /// `None` for single-page sites.
    pub fn page(&self) -> Option<u32> {
        self.page
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn extractor(&self) -> &dyn Extractor {
        self.extractor.as_ref()
    }

    /// Human label used in status lines, e.g. `www.kuaidaili.com - 3`.
    pub fn label(&self) -> String {
        match self.page {
            Some(page) => format!("{} - {}", self.site.hostname(), page),
            None => self.site.hostname().to_string(),
        }
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("site", &self.site)
            .field("page", &self.page)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}
