pub mod record;
pub mod site;
pub mod table;

pub use record::{ProxyRecord, RawRow};
pub use site::{RowScope, SiteId, SiteProfile};
pub use table::TableExtractor;

/// Page-scoped scraping routine bound to a job.
///
/// Receives the rendered document of a successfully loaded page and returns
/// the records found on it, in row order. Rows that do not qualify are
/// dropped silently; a page without the expected container yields nothing.
pub trait Extractor: Send + Sync {
    fn site(&self) -> SiteId;
    fn extract(&self, document: &str) -> Vec<ProxyRecord>;
}
