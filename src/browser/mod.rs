pub mod manager;
pub mod user_agent;


use async_trait::async_trait;

use crate::error::Result;

pub use manager::{ChromeBrowser, ChromePage, PageId};
pub use user_agent::UserAgentPool;

/// Whether a page load completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    Success,
    Failure,
}

impl NavigationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, NavigationOutcome::Success)
    }
}

/// One page-scoped browsing context.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageSession: Send {
    /// Load `url` and wait until navigation settles. Never errors; a page
    /// that could not be loaded reports [`NavigationOutcome::Failure`].
    async fn navigate(&mut self, url: &str) -> NavigationOutcome;

    /// Rendered DOM of the loaded page.
    async fn document(&self) -> Result<String>;

    async fn close(&mut self) -> Result<()>;
}

/// Something that can hand out fresh pages, usually a running browser.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BrowsingContext: Send + Sync {
    async fn open_page(&self) -> Result<Box<dyn PageSession>>;
}
