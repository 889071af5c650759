//! Owned engine configuration.
//!
//! This type is the stable handoff between callers (CLI, scheduler) and the
//! engine internals. Every timeout the filter controller and extractor wait
//! on is named here so timing assumptions are visible and overridable.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
	/// Search page the session navigates blank tabs to.
	pub entry_url: String,
	/// Local remote-debugging port the browser is attached on.
	pub cdp_port: u16,
	/// Persistent profile directory; this is what keeps the manually
	/// established login alive across browser restarts.
	pub profile_dir: PathBuf,
	/// Maximum result rows extracted per scrape.
	pub row_cap: usize,
	/// Uniform retry policy for session acquisition and field operations.
	pub retry: RetryPolicy,
	/// Wait before first endpoint poll after spawning the browser.
	pub launch_wait_ms: u64,
	/// Bounded wait for the picker's text input to appear.
	pub picker_timeout_ms: u64,
	/// Bounded wait for autocomplete suggestions to populate.
	pub suggestion_timeout_ms: u64,
	/// Bounded wait for a row's detail panel to open.
	pub panel_timeout_ms: u64,
	/// Bounded wait for page readiness after search submission.
	pub search_timeout_ms: u64,
	/// Bounded wait for result rows to appear before extraction.
	pub rows_timeout_ms: u64,
	/// Fixed settle delay applied after the readiness wait.
	pub settle_delay_ms: u64,
	/// Radius option selected for fully qualified places.
	pub preferred_radius: String,
	/// Container selector for the loading-place filter field.
	pub loading_field_selector: String,
	/// Container selector for the unloading-place filter field.
	pub unloading_field_selector: String,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			entry_url: "https://platform.trans.eu/exchange/offers".into(),
			cdp_port: 9222,
			profile_dir: PathBuf::from("chrome_profile"),
			row_cap: 50,
			retry: RetryPolicy::default(),
			launch_wait_ms: 3_000,
			picker_timeout_ms: 3_000,
			suggestion_timeout_ms: 4_000,
			panel_timeout_ms: 2_000,
			search_timeout_ms: 8_000,
			rows_timeout_ms: 5_000,
			settle_delay_ms: 1_500,
			preferred_radius: "+ 75 km".into(),
			loading_field_selector: r#"[data-ctx="place-loading_place-0"]"#.into(),
			unloading_field_selector: r#"[data-ctx="place-unloading_place-0"]"#.into(),
		}
	}
}

impl EngineConfig {
	pub fn settle_delay(&self) -> Duration {
		Duration::from_millis(self.settle_delay_ms)
	}

	pub fn launch_wait(&self) -> Duration {
		Duration::from_millis(self.launch_wait_ms)
	}
}
