//! Filter application over the search page.
//!
//! Applies a full `FilterSpec` field by field. Every field is retried and
//! contained on its own: a field that cannot be set is reported as skipped
//! and the remaining fields still run, so a drifted selector degrades the
//! search instead of aborting it.

mod location;
mod range;

use std::sync::LazyLock;

use chromiumoxide::Page;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{Result, ScoutError};
use crate::model::FilterSpec;
use crate::page;
use crate::retry::with_retry;

pub use location::{LocationField, PickerState, is_fully_qualified_place, set_location_field};
pub use range::{LOADING_DATE, RangeField, UNLOADING_DATE, WEIGHT, set_range_field};

/// Collapsed filter panels hide the date and weight inputs.
static EXPAND_LABEL: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?i)expand filters|more filters|all filters|rozwiń filtry|развернуть фильтры").unwrap()
});

/// Search submit control, across the UI languages the platform ships.
static SEARCH_LABEL: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)\b(search|find offers|szukaj|поиск|найти)\b").unwrap());

pub struct FilterController<'a> {
	page: &'a Page,
	config: &'a EngineConfig,
}

impl<'a> FilterController<'a> {
	pub fn new(page: &'a Page, config: &'a EngineConfig) -> Self {
		Self { page, config }
	}

	/// Applies the whole spec and submits the search. Returns the labels of
	/// fields that could not be set after retries.
	pub async fn apply(&self, spec: &FilterSpec) -> Result<Vec<String>> {
		let mut skipped = Vec::new();

		// The filter bar sits above the fold.
		let _ = self.page.evaluate("window.scrollTo(0, 0)").await;

		let loading = LocationField {
			label: "loading place",
			selector: &self.config.loading_field_selector,
		};
		self.guarded(&mut skipped, loading.label, || {
			set_location_field(self.page, self.config, &loading, spec.origin.as_deref())
		})
		.await;

		let unloading = LocationField {
			label: "unloading place",
			selector: &self.config.unloading_field_selector,
		};
		self.guarded(&mut skipped, unloading.label, || {
			set_location_field(self.page, self.config, &unloading, Some(spec.destination.as_str()))
		})
		.await;

		self.ensure_filters_expanded().await;

		self.guarded(&mut skipped, LOADING_DATE.label, || {
			set_range_field(
				self.page,
				self.config,
				&LOADING_DATE,
				spec.loading_date_from.as_deref(),
				spec.loading_date_to.as_deref(),
			)
		})
		.await;

		self.guarded(&mut skipped, UNLOADING_DATE.label, || {
			set_range_field(
				self.page,
				self.config,
				&UNLOADING_DATE,
				spec.unloading_date_from.as_deref(),
				spec.unloading_date_to.as_deref(),
			)
		})
		.await;

		if let Some(tons) = spec.normalized_max_weight_tons() {
			let formatted = format_weight(tons);
			self.guarded(&mut skipped, WEIGHT.label, || {
				set_range_field(self.page, self.config, &WEIGHT, None, Some(formatted.as_str()))
			})
			.await;
		}

		self.guarded(&mut skipped, "search submit", || self.submit_search()).await;

		if skipped.is_empty() {
			info!(target = "scout", "all filter fields applied");
		} else {
			warn!(target = "scout", skipped = ?skipped, "search ran with skipped fields");
		}
		Ok(skipped)
	}

	/// Runs one field operation under the retry policy; exhaustion marks
	/// the field skipped instead of propagating.
	async fn guarded<F, Fut>(&self, skipped: &mut Vec<String>, label: &str, op: F)
	where
		F: FnMut() -> Fut,
		Fut: Future<Output = Result<()>>,
	{
		if let Err(err) = with_retry(self.config.retry, label, op).await {
			warn!(target = "scout", field = label, error = %err, "field skipped after retries");
			skipped.push(label.to_string());
		}
	}

	/// Clicks the expand-filters toggle when present. Best effort; an
	/// already expanded panel simply has no such control.
	async fn ensure_filters_expanded(&self) {
		let Some(toggle) =
			page::find_first_matching(self.page, r#"button, [role="button"], a"#, &EXPAND_LABEL).await
		else {
			debug!(target = "scout", "no expand-filters toggle, panel assumed expanded");
			return;
		};
		if toggle.click().await.is_ok() {
			debug!(target = "scout", "filter panel expanded");
			tokio::time::sleep(self.config.settle_delay() / 3).await;
		}
	}

	async fn submit_search(&self) -> Result<()> {
		let button = match page::find_last_matching(
			self.page,
			r#"button, [role="button"], input[type="submit"]"#,
			&SEARCH_LABEL,
		)
		.await
		{
			Some(button) => button,
			None => self
				.page
				.find_element(r#"button[type="submit"]"#)
				.await
				.map_err(|_| ScoutError::ElementNotFound {
					selector: "search submit button".into(),
				})?,
		};
		button.click().await?;

		if !page::wait_for_ready(self.page, self.config.search_timeout_ms).await {
			debug!(target = "scout", "readiness wait expired, relying on settle delay");
		}
		tokio::time::sleep(self.config.settle_delay()).await;
		Ok(())
	}
}

fn format_weight(tons: f64) -> String {
	if (tons - tons.trunc()).abs() < f64::EPSILON {
		format!("{}", tons.trunc() as i64)
	} else {
		format!("{tons}")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn search_label_covers_platform_languages() {
		for text in ["Search", "search", "Szukaj", "Поиск", "Найти", "Find offers"] {
			assert!(SEARCH_LABEL.is_match(text), "{text} should match");
		}
		assert!(!SEARCH_LABEL.is_match("Filters"));
		assert!(!SEARCH_LABEL.is_match("Research"));
	}

	#[test]
	fn expand_label_matches_collapsed_panel_toggle() {
		assert!(EXPAND_LABEL.is_match("Expand filters"));
		assert!(EXPAND_LABEL.is_match("More filters"));
		assert!(!EXPAND_LABEL.is_match("Clear filters"));
	}

	#[test]
	fn weight_formats_without_trailing_fraction() {
		assert_eq!(format_weight(24.0), "24");
		assert_eq!(format_weight(7.5), "7.5");
		assert_eq!(format_weight(0.8), "0.8");
	}
}
