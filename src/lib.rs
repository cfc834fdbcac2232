pub mod browser;
pub mod config;
pub mod error;
pub mod extractor;
pub mod jobs;
pub mod report;
pub mod scheduler;

pub use error::{Result, ScrapingError};
pub use config::Config;
pub use browser::{BrowsingContext, ChromeBrowser, NavigationOutcome, PageSession};
pub use extractor::{Extractor, ProxyRecord, SiteId};
pub use jobs::{Job, JobFactory, JobQueue};
pub use report::Reporter;
pub use scheduler::{RunSummary, Scheduler, SchedulerSettings};
