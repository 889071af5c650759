//! Scrape orchestration.
//!
//! One `run` is the whole pipeline: resolve the origin, acquire the
//! session, apply filters, extract, persist. Failure severity is graded:
//! only session acquisition and total navigation failure abort; everything
//! else degrades the result and is reported in the summary.

use async_trait::async_trait;
use chromiumoxide::Page;
use chrono::Local;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::error::{Result, ScoutError};
use crate::extract::ListingExtractor;
use crate::filter::FilterController;
use crate::model::{FilterSpec, ListingRecord};
use crate::session::SessionManager;

/// Result of persisting one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
	Inserted,
	/// The external id already existed. Expected on repeated scrapes.
	Duplicate,
}

/// Persistence boundary. Implementations must treat `external_id` as the
/// unique key so repeated scrapes of the same listings stay idempotent.
#[async_trait]
pub trait ListingStore: Send + Sync {
	async fn upsert_by_external_id(&self, record: &ListingRecord) -> Result<UpsertOutcome>;
}

/// Supplies the origin place when the caller leaves it unset, typically
/// from the vehicle's last known position.
#[async_trait]
pub trait LocationResolver: Send + Sync {
	async fn current_origin(&self) -> Result<String>;
}

/// Per-run summary handed back to the caller.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ScrapeReport {
	pub extracted: usize,
	pub inserted: usize,
	pub duplicates: usize,
	pub skipped_fields: Vec<String>,
}

/// Owns the session and drives the pipeline. `run` takes `&mut self`, so
/// one runner never interleaves two scrapes on the same browser.
pub struct ScrapeRunner<S, L> {
	session: SessionManager,
	store: S,
	locations: L,
	config: EngineConfig,
}

impl<S: ListingStore, L: LocationResolver> ScrapeRunner<S, L> {
	pub fn new(config: EngineConfig, store: S, locations: L) -> Self {
		Self {
			session: SessionManager::new(config.clone()),
			store,
			locations,
			config,
		}
	}

	pub async fn run(&mut self, spec: FilterSpec) -> Result<ScrapeReport> {
		let spec = self.effective_spec(spec).await;
		info!(
			target = "scout",
			destination = %spec.destination,
			origin = spec.origin.as_deref().unwrap_or("-"),
			"scrape starting"
		);

		let page = {
			let handle = self.session.acquire().await?;
			handle.page().clone()
		};
		self.ensure_search_page(&page).await?;

		let skipped_fields = FilterController::new(&page, &self.config).apply(&spec).await?;
		let records = ListingExtractor::new(&page, &self.config).extract().await?;

		let (inserted, duplicates) = persist(&self.store, &records).await;
		let report = ScrapeReport {
			extracted: records.len(),
			inserted,
			duplicates,
			skipped_fields,
		};
		info!(
			target = "scout",
			extracted = report.extracted,
			inserted = report.inserted,
			duplicates = report.duplicates,
			"scrape finished"
		);
		Ok(report)
	}

	/// Detaches from the browser without closing it.
	pub fn release_session(&mut self) {
		self.session.release();
	}

	/// Resolves the origin when unset and fills default date bounds. A
	/// failed origin lookup degrades to an origin-less search.
	async fn effective_spec(&self, mut spec: FilterSpec) -> FilterSpec {
		if !spec.has_origin() {
			match self.locations.current_origin().await {
				Ok(origin) => {
					info!(target = "scout", %origin, "origin resolved from current position");
					spec.origin = Some(origin);
				}
				Err(err) => {
					warn!(target = "scout", error = %err, "origin resolution failed, searching without origin");
					spec.origin = None;
				}
			}
		}
		spec.with_default_dates(Local::now().date_naive())
	}

	/// Navigates to the search page when the reused tab drifted elsewhere.
	/// Navigation failure here means nothing downstream can work.
	async fn ensure_search_page(&self, page: &Page) -> Result<()> {
		let url = page.url().await?.unwrap_or_default();
		if url.starts_with(&self.config.entry_url) {
			return Ok(());
		}
		info!(target = "scout", from = %url, "navigating to search page");
		page.goto(self.config.entry_url.as_str())
			.await
			.map_err(|e| ScoutError::Connection(format!("navigation to search page failed: {e}")))?;
		let _ = page.wait_for_navigation().await;
		tokio::time::sleep(self.config.settle_delay()).await;
		Ok(())
	}
}

/// Upserts every record, counting outcomes. Store errors are contained
/// per record; the remaining records are still written.
async fn persist<S: ListingStore>(store: &S, records: &[ListingRecord]) -> (usize, usize) {
	let mut inserted = 0;
	let mut duplicates = 0;
	for record in records {
		match store.upsert_by_external_id(record).await {
			Ok(UpsertOutcome::Inserted) => inserted += 1,
			Ok(UpsertOutcome::Duplicate) => duplicates += 1,
			Err(err) => {
				warn!(target = "scout", external_id = %record.external_id, error = %err, "upsert failed, continuing")
			}
		}
	}
	(inserted, duplicates)
}
