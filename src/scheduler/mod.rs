use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::browser::{BrowsingContext, NavigationOutcome, PageSession};
use crate::config::Config;
use crate::error::Result;
use crate::jobs::{Job, JobQueue};
use crate::report::Reporter;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerSettings {
    /// Pause before each job is started.
    pub inter_job_delay: Duration,
    /// `None` waits on a navigation for as long as it takes.
    pub navigation_timeout: Option<Duration>,
}

impl From<&Config> for SchedulerSettings {
    fn from(config: &Config) -> Self {
        Self {
            inter_job_delay: config.inter_job_delay(),
            navigation_timeout: config.navigation_timeout(),
        }
    }
}

/// How a single job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Extracted(usize),
    /// Page loaded but nothing on it qualified.
    Empty,
    NavigationFailed,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub jobs_run: usize,
    pub navigation_failures: usize,
    pub empty_jobs: usize,
    pub records_emitted: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    fn start() -> Self {
        Self {
            jobs_run: 0,
            navigation_failures: 0,
            empty_jobs: 0,
            records_emitted: 0,
            started_at: Utc::now(),
            finished_at: Utc::now(),
        }
    }

    fn count(&mut self, outcome: JobOutcome) {
        self.jobs_run += 1;
        match outcome {
            JobOutcome::Extracted(_) => {}
            JobOutcome::Empty => self.empty_jobs += 1,
            JobOutcome::NavigationFailed => self.navigation_failures += 1,
        }
    }
}

/// Runs the job queue one job at a time until it is empty.
///
/// Job failures never stop the run: a page that cannot be opened or loaded
/// just produces no records. Only a broken output stream ends it early.
pub struct Scheduler {
    queue: JobQueue,
    browser: Arc<dyn BrowsingContext>,
    reporter: Reporter,
    settings: SchedulerSettings,
}

impl Scheduler {
    pub fn new(
        queue: JobQueue,
        browser: Arc<dyn BrowsingContext>,
        reporter: Reporter,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            queue,
            browser,
            reporter,
            settings,
        }
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub async fn run(mut self) -> Result<RunSummary> {
        let mut summary = RunSummary::start();
        info!("Scheduler starting with {} jobs", self.queue.len());

        while let Some(job) = self.queue.pop() {
            self.reporter.system(format!(
                "starting in {:.1} seconds",
                self.settings.inter_job_delay.as_secs_f64()
            ))?;
            tokio::time::sleep(self.settings.inter_job_delay).await;

            let outcome = self.run_job(&job).await?;
            debug!("Job {} finished: {:?} ({} left)", job.url(), outcome, self.queue.len());
            summary.count(outcome);
        }

        summary.records_emitted = self.reporter.records_emitted();
        summary.finished_at = Utc::now();

        if summary.jobs_run > 0 {
            self.reporter.system(format!(
                "finished: {} jobs, {} records, {} failed navigations, {} empty pages",
                summary.jobs_run, summary.records_emitted, summary.navigation_failures, summary.empty_jobs
            ))?;
        }
        info!(
            "Scheduler done: {} jobs, {} records",
            summary.jobs_run, summary.records_emitted
        );
        Ok(summary)
    }

    async fn run_job(&mut self, job: &Job) -> Result<JobOutcome> {
        self.reporter.system(format!("accessing {}", job.label()))?;

        let mut page = match self.browser.open_page().await {
            Ok(page) => page,
            Err(e) => {
                warn!("Could not open a page for {}: {}", job.url(), e);
                self.reporter.system(format!("could not open page for {}, skipped", job.url()))?;
                return Ok(JobOutcome::NavigationFailed);
            }
        };

        let outcome = self.scrape(job, page.as_mut()).await;

        if let Err(e) = page.close().await {
            warn!("Failed to close page for {}: {}", job.url(), e);
        }
        outcome
    }

    async fn scrape(&mut self, job: &Job, page: &mut dyn PageSession) -> Result<JobOutcome> {
        if !self.navigate(page, job.url()).await.is_success() {
            self.reporter.system(format!("navigation failed for {}, skipped", job.url()))?;
            return Ok(JobOutcome::NavigationFailed);
        }

        let document = match page.document().await {
            Ok(document) => document,
            Err(e) => {
                warn!("Could not read the document of {}: {}", job.url(), e);
                self.reporter.system(format!("could not read {}, skipped", job.url()))?;
                return Ok(JobOutcome::NavigationFailed);
            }
        };

        let records = job.extractor().extract(&document);
        if records.is_empty() {
            self.reporter.system(format!("no records from {}", job.label()))?;
            return Ok(JobOutcome::Empty);
        }

        for record in &records {
            self.reporter.record(record)?;
        }
        Ok(JobOutcome::Extracted(records.len()))
    }

    async fn navigate(&self, page: &mut dyn PageSession, url: &str) -> NavigationOutcome {
        match self.settings.navigation_timeout {
            Some(limit) => match tokio::time::timeout(limit, page.navigate(url)).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!("Navigation to {} timed out after {:?}", url, limit);
                    NavigationOutcome::Failure
                }
            },
            None => page.navigate(url).await,
        }
    }
}
