//! Per-row listing extraction.
//!
//! Walks the result table row by row: read the row text, open its detail
//! panel, parse both, merge. A failing row is logged and skipped; the walk
//! never aborts on one bad row. Escape is sent after every row regardless
//! of outcome, because a stuck panel corrupts every later row.

pub mod parse;

use std::time::Duration;

use chromiumoxide::{Element, Page};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{Result, ScoutError};
use crate::locator;
use crate::model::{ListingDetail, ListingRecord};
use crate::page;

pub struct ListingExtractor<'a> {
	page: &'a Page,
	config: &'a EngineConfig,
}

impl<'a> ListingExtractor<'a> {
	pub fn new(page: &'a Page, config: &'a EngineConfig) -> Self {
		Self { page, config }
	}

	/// Extracts up to `row_cap` listings from the current result table.
	/// An empty table is a valid empty extraction, not an error.
	pub async fn extract(&self) -> Result<Vec<ListingRecord>> {
		let rows = page::poll_until(self.config.rows_timeout_ms, || async {
			let found = locator::find_all_first(self.page, locator::RESULT_ROWS)
				.await
				.unwrap_or_default();
			(!found.is_empty()).then_some(found)
		})
		.await
		.unwrap_or_default();

		if rows.is_empty() {
			info!(target = "scout", "no result rows, returning empty extraction");
			return Ok(Vec::new());
		}

		let total = rows.len().min(self.config.row_cap);
		debug!(target = "scout", rows = rows.len(), capped = total, "extracting rows");

		let mut records = Vec::with_capacity(total);
		for (index, row) in rows.iter().take(self.config.row_cap).enumerate() {
			match self.extract_row(index, row).await {
				Ok(Some(record)) => records.push(record),
				Ok(None) => debug!(target = "scout", row = index, "non-listing row skipped"),
				Err(err) => {
					warn!(target = "scout", row = index, error = %err, "row failed, continuing")
				}
			}
			// Close whatever the row click left open, success or not.
			page::send_escape(self.page).await;
			tokio::time::sleep(Duration::from_millis(250)).await;
		}

		info!(target = "scout", extracted = records.len(), "extraction finished");
		Ok(records)
	}

	async fn extract_row(&self, index: usize, row: &Element) -> Result<Option<ListingRecord>> {
		let text = row
			.inner_text()
			.await
			.map_err(|e| ScoutError::RowExtraction {
				index,
				reason: format!("row text unreadable: {e}"),
			})?
			.unwrap_or_default();

		let Some(summary) = parse::parse_summary(&text) else {
			return Ok(None);
		};

		let native_id = row.attribute("data-id").await.ok().flatten();

		// A failed panel open still yields a summary-only record.
		let detail = match self.open_detail(index, row).await {
			Ok(detail) => detail,
			Err(err) => {
				warn!(target = "scout", row = index, error = %err, "detail panel failed, keeping summary");
				ListingDetail::default()
			}
		};

		Ok(Some(ListingRecord::merge(native_id, summary, detail)))
	}

	async fn open_detail(&self, index: usize, row: &Element) -> Result<ListingDetail> {
		row.click().await.map_err(|e| ScoutError::RowExtraction {
			index,
			reason: format!("row click failed: {e}"),
		})?;

		let panel = page::poll_until(self.config.panel_timeout_ms, || async {
			locator::find_first(self.page, locator::DETAIL_PANEL)
				.await
				.map(|(element, _)| element)
		})
		.await;

		let text = match panel {
			Some(element) => element.inner_text().await.ok().flatten().unwrap_or_default(),
			None => {
				// Some revisions expand the detail inline instead of a panel.
				debug!(target = "scout", row = index, "no panel, falling back to page text");
				self.page
					.find_element("body")
					.await?
					.inner_text()
					.await
					.ok()
					.flatten()
					.unwrap_or_default()
			}
		};
		Ok(parse::parse_detail(&text))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::ListingSummary;

	fn summary(loading: &str, unloading: &str) -> ListingSummary {
		ListingSummary {
			loading_place: loading.to_string(),
			unloading_place: unloading.to_string(),
			loading_date: Some("16.03.2026".into()),
			unloading_date: Some("17.03.2026".into()),
			price_text: Some("920 EUR".into()),
			currency: Some("EUR".into()),
			weight_kg: Some(24_000.0),
		}
	}

	#[test]
	fn merged_records_get_distinct_stable_ids() {
		let a = ListingRecord::merge(None, summary("DE 10115 Berlin", "PL 00-001 Warszawa"), ListingDetail::default());
		let b = ListingRecord::merge(None, summary("DE 10115 Berlin", "CZ 11000 Praha"), ListingDetail::default());
		assert_ne!(a.external_id, b.external_id);
		assert!(a.external_id.starts_with("gen-"));
	}

	#[test]
	fn native_row_id_wins_over_generated_id() {
		let record = ListingRecord::merge(
			Some("offer-81214".into()),
			summary("DE 10115 Berlin", "PL 00-001 Warszawa"),
			ListingDetail::default(),
		);
		assert_eq!(record.external_id, "offer-81214");
	}

	#[test]
	fn three_distinguishable_rows_yield_three_distinct_records() {
		let rows = [
			"SK 93101 Šamorín\n15.03.2026, 08:00\nDE 10115 Berlin\n16.03.2026\n920 EUR",
			"SK 93101 Šamorín\n15.03.2026, 08:00\nDE 10115 Berlin\n16.03.2026\n940 EUR",
			"PL 00-001 Warszawa\n15.03.2026\nDE 10115 Berlin\n16.03.2026\n700 EUR",
		];
		let records: Vec<ListingRecord> = rows
			.iter()
			.filter_map(|text| parse::parse_summary(text))
			.map(|summary| ListingRecord::merge(None, summary, ListingDetail::default()))
			.collect();

		assert_eq!(records.len(), 3);
		for record in &records {
			assert!(!record.summary.loading_place.is_empty());
			assert!(!record.summary.unloading_place.is_empty());
		}
		let mut ids: Vec<&str> = records.iter().map(|r| r.external_id.as_str()).collect();
		ids.sort_unstable();
		ids.dedup();
		assert_eq!(ids.len(), 3);
	}

	#[test]
	fn summary_only_record_survives_missing_detail() {
		let record = ListingRecord::merge(None, summary("DE 10115 Berlin", "PL 00-001 Warszawa"), ListingDetail::default());
		assert_eq!(record.summary.loading_place, "DE 10115 Berlin");
		assert_eq!(record.detail, ListingDetail::default());
	}
}
