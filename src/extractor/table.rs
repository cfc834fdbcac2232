use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::ScrapingError;
use crate::extractor::{Extractor, ProxyRecord, RawRow, RowScope, SiteId, SiteProfile};

/// Generic row/cell extractor driven by a [`SiteProfile`].
pub struct TableExtractor {
    profile: &'static SiteProfile,
    container_selector: Option<Selector>,
    row_selector: Selector,
    cell_selector: Selector,
}

fn parse_selector(css: &str) -> Result<Selector, ScrapingError> {
    Selector::parse(css).map_err(|e| ScrapingError::ParseError(format!("Invalid selector '{}': {}", css, e)))
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

impl TableExtractor {
    pub fn new(site: SiteId) -> Result<Self, ScrapingError> {
        Self::from_profile(site.profile())
    }

    pub fn from_profile(profile: &'static SiteProfile) -> Result<Self, ScrapingError> {
        let (container_selector, row_selector) = match profile.scope {
            RowScope::NthContainer { container, rows, .. } => (Some(parse_selector(container)?), parse_selector(rows)?),
            RowScope::Rows(rows) => (None, parse_selector(rows)?),
        };

        Ok(Self {
            profile,
            container_selector,
            row_selector,
            cell_selector: parse_selector(profile.cell_selector)?,
        })
    }

    pub fn profile(&self) -> &SiteProfile {
        self.profile
    }

    /// Candidate rows of a loaded document, header already dropped.
    /// A missing container gives an empty sequence.
    pub fn raw_rows<'a>(&'a self, document: &'a Html) -> Box<dyn Iterator<Item = RawRow> + 'a> {
        let rows: Box<dyn Iterator<Item = ElementRef<'a>> + 'a> = match (&self.container_selector, self.profile.scope) {
            (Some(container_selector), RowScope::NthContainer { index, .. }) => {
                match document.select(container_selector).nth(index) {
                    Some(container) => Box::new(container.select(&self.row_selector)),
                    None => {
                        debug!("{}: container #{} not found on page", self.profile.site, index);
                        Box::new(std::iter::empty())
                    }
                }
            }
            _ => Box::new(document.select(&self.row_selector)),
        };

        let skip = usize::from(self.profile.skip_header);
        Box::new(
            rows.skip(skip)
                .map(move |row| RawRow::new(row.select(&self.cell_selector).map(cell_text).collect())),
        )
    }

    /// Maps a row to a record, `None` for rows shorter than the site requires.
    pub fn to_record(&self, row: &RawRow) -> Option<ProxyRecord> {
        if row.len() < self.profile.min_cells {
            debug!("{}: skipping short row with {} cells", self.profile.site, row.len());
            return None;
        }
        let host = row.cell(self.profile.host_index)?;
        let port = row.cell(self.profile.port_index)?;
        Some(ProxyRecord::new(self.profile.site, host, port))
    }
}

impl Extractor for TableExtractor {
    fn site(&self) -> SiteId {
        self.profile.site
    }

    fn extract(&self, document: &str) -> Vec<ProxyRecord> {
        let document = Html::parse_document(document);
        let records: Vec<ProxyRecord> = self
            .raw_rows(&document)
            .filter_map(|row| self.to_record(&row))
            .collect();

        debug!("{}: extracted {} records", self.profile.site, records.len());
        records
    }
}
