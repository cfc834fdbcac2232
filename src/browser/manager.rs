use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetUserAgentOverrideParams;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::browser::{BrowsingContext, NavigationOutcome, PageSession, UserAgentPool};
use crate::config::BrowserSettings;
use crate::error::{Result, ScrapingError};

pub type PageId = Uuid;

const LAUNCH_ATTEMPTS: u32 = 3;

/// A single tab of the headless browser.
pub struct ChromePage {
    pub id: PageId,
    page: Page,
}

#[async_trait]
impl PageSession for ChromePage {
    async fn navigate(&mut self, url: &str) -> NavigationOutcome {
        debug!("Page {} navigating to {}", self.id, url);

        if let Err(e) = self.page.goto(url).await {
            warn!("Page {} failed to navigate to {}: {}", self.id, url, e);
            return NavigationOutcome::Failure;
        }

        match self.page.wait_for_navigation().await {
            Ok(_) => {
                debug!("Page {} finished loading {}", self.id, url);
                NavigationOutcome::Success
            }
            Err(e) => {
                warn!("Page {} never finished loading {}: {}", self.id, url, e);
                NavigationOutcome::Failure
            }
        }
    }

    async fn document(&self) -> Result<String> {
        let html = self
            .page
            .content()
            .await
            .map_err(|e| ScrapingError::BrowserError(format!("Failed to get page content: {}", e)))?;
        Ok(html)
    }

    async fn close(&mut self) -> Result<()> {
        self.page
            .clone()
            .close()
            .await
            .map_err(|e| ScrapingError::BrowserError(format!("Failed to close page {}: {}", self.id, e)))?;

        debug!("Closed page {}", self.id);
        Ok(())
    }
}

/// Headless Chromium driven over CDP.
pub struct ChromeBrowser {
    browser: Mutex<Browser>,
    handler_task: JoinHandle<()>,
    user_agents: Option<UserAgentPool>,
    // removed from disk when the browser is dropped
    profile_dir: TempDir,
}

impl ChromeBrowser {
    pub async fn launch(settings: &BrowserSettings) -> Result<Self> {
        info!("Launching browser (headless: {})", settings.headless);

        // unique profile dir so concurrent runs don't fight over the singleton lock
        let profile_dir = tempfile::Builder::new()
            .prefix(&format!("proxy-seeder-{}-", std::process::id()))
            .tempdir()
            .map_err(|e| ScrapingError::BrowserError(format!("Failed to create profile directory: {}", e)))?;

        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .user_data_dir(profile_dir.path())
            .args(vec![
                "--disable-gpu",
                "--disable-dev-shm-usage",
                "--disable-extensions",
                "--disable-plugins",
                "--mute-audio",
                "--no-first-run",
                "--disable-default-apps",
                "--disable-sync",
                "--disable-background-networking",
                "--disable-blink-features=AutomationControlled",
                "--log-level=3",
            ]);

        if !settings.headless {
            builder = builder.with_head();
        }
        if !settings.extra_args.is_empty() {
            builder = builder.args(settings.extra_args.iter().map(String::as_str));
        }

        let browser_config = builder
            .build()
            .map_err(|e| ScrapingError::BrowserError(format!("Failed to create browser config: {}", e)))?;

        let mut last_error = None;
        for attempt in 1..=LAUNCH_ATTEMPTS {
            match Browser::launch(browser_config.clone()).await {
                Ok((browser, mut handler)) => {
                    info!("Browser launched successfully on attempt {}", attempt);

                    let handler_task = tokio::spawn(async move {
                        while let Some(event) = handler.next().await {
                            if let Err(e) = event {
                                let error_msg = e.to_string();
                                if error_msg.contains("data did not match any variant")
                                    || error_msg.contains("untagged enum Message")
                                {
                                    debug!("Ignoring WebSocket deserialization error: {}", e);
                                } else {
                                    warn!("Browser handler error: {}", e);
                                }
                            }
                        }
                        debug!("Browser handler task ended");
                    });

                    let user_agents = settings.randomize_user_agent.then(UserAgentPool::new);

                    return Ok(Self {
                        browser: Mutex::new(browser),
                        handler_task,
                        user_agents,
                        profile_dir,
                    });
                }
                Err(e) => {
                    error!("Browser launch attempt {} failed: {}", attempt, e);
                    last_error = Some(e.to_string());
                    if attempt < LAUNCH_ATTEMPTS {
                        tokio::time::sleep(Duration::from_secs(2)).await;
                    }
                }
            }
        }

        Err(ScrapingError::BrowserError(format!(
            "Failed to launch browser after {} attempts: {}",
            LAUNCH_ATTEMPTS,
            last_error.unwrap_or_default()
        ))
        .into())
    }

    pub async fn shutdown(&self) -> Result<()> {
        info!("Shutting down browser");
        let mut browser = self.browser.lock().await;

        browser
            .close()
            .await
            .map_err(|e| ScrapingError::BrowserError(format!("Failed to close browser: {}", e)))?;
        if let Err(e) = browser.wait().await {
            warn!("Browser process did not exit cleanly: {}", e);
        }

        self.handler_task.abort();
        Ok(())
    }

    pub fn profile_dir(&self) -> &Path {
        self.profile_dir.path()
    }

    async fn apply_user_agent(&self, page: &Page, page_id: PageId) -> Result<()> {
        let Some(user_agent) = self.user_agents.as_ref().and_then(UserAgentPool::random) else {
            return Ok(());
        };

        let params = SetUserAgentOverrideParams::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| ScrapingError::BrowserError(format!("Failed to build user agent params: {}", e)))?;

        page.execute(params)
            .await
            .map_err(|e| ScrapingError::BrowserError(format!("Failed to set user agent: {}", e)))?;

        debug!("Page {} using user agent {}", page_id, user_agent);
        Ok(())
    }
}

#[async_trait]
impl BrowsingContext for ChromeBrowser {
    async fn open_page(&self) -> Result<Box<dyn PageSession>> {
        let id = Uuid::new_v4();

        let page = {
            let browser = self.browser.lock().await;
            match tokio::time::timeout(Duration::from_secs(10), browser.new_page("about:blank")).await {
                Ok(Ok(page)) => page,
                Ok(Err(e)) => {
                    return Err(ScrapingError::BrowserError(format!("Failed to create new page: {}", e)).into());
                }
                Err(_) => {
                    return Err(ScrapingError::BrowserError("Timeout creating new page".to_string()).into());
                }
            }
        };

        self.apply_user_agent(&page, id).await?;

        debug!("Opened page {}", id);
        Ok(Box::new(ChromePage { id, page }))
    }
}
