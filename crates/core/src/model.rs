//! Data model for one scrape invocation: the caller-supplied filter spec
//! and the listing records extracted from the result list.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Date format used by the marketplace filter panel.
pub const DATE_FMT: &str = "%d.%m.%Y";

/// Caller-supplied search criteria. Immutable per invocation; the
/// orchestrator derives an effective copy via [`FilterSpec::with_default_dates`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
	pub origin: Option<String>,
	pub destination: String,
	pub loading_date_from: Option<String>,
	pub loading_date_to: Option<String>,
	pub unloading_date_from: Option<String>,
	pub unloading_date_to: Option<String>,
	pub max_weight_tons: Option<f64>,
}

impl FilterSpec {
	/// Fills missing upper date bounds: loading up to `today`, unloading up
	/// to the following day. Explicit bounds are left untouched.
	pub fn with_default_dates(mut self, today: NaiveDate) -> Self {
		if self.loading_date_to.is_none() {
			self.loading_date_to = Some(today.format(DATE_FMT).to_string());
		}
		if self.unloading_date_to.is_none() {
			let next = today.checked_add_days(Days::new(1)).unwrap_or(today);
			self.unloading_date_to = Some(next.format(DATE_FMT).to_string());
		}
		self
	}

	/// Max weight in tons. Values above 100 are assumed to be kilograms and
	/// converted.
	pub fn normalized_max_weight_tons(&self) -> Option<f64> {
		self.max_weight_tons.map(|w| if w > 100.0 { w / 1000.0 } else { w })
	}

	pub fn has_origin(&self) -> bool {
		self.origin.as_deref().is_some_and(|o| !o.trim().is_empty())
	}
}

/// Fields parsed from a result row's visible text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingSummary {
	pub loading_place: String,
	pub unloading_place: String,
	pub loading_date: Option<String>,
	pub unloading_date: Option<String>,
	pub price_text: Option<String>,
	pub currency: Option<String>,
	pub weight_kg: Option<f64>,
}

/// Fields parsed from a listing's detail panel. Each one is independently
/// optional: a missing label never fails the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingDetail {
	pub body_type: Option<String>,
	pub capacity_text: Option<String>,
	pub loading_meters: Option<f64>,
	pub payment_terms: Option<String>,
	pub additional_description: Option<String>,
}

/// Fully merged representation of one freight offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
	pub external_id: String,
	#[serde(flatten)]
	pub summary: ListingSummary,
	#[serde(flatten)]
	pub detail: ListingDetail,
}

impl ListingRecord {
	/// Merges summary and detail, preferring the source's native id and
	/// falling back to the stable content hash.
	pub fn merge(native_id: Option<String>, summary: ListingSummary, detail: ListingDetail) -> Self {
		let external_id = native_id
			.filter(|id| !id.trim().is_empty())
			.unwrap_or_else(|| stable_external_id(&summary));
		Self {
			external_id,
			summary,
			detail,
		}
	}
}

/// Deterministic id over (loading place, unloading place, loading date,
/// price text). The same underlying listing always hashes identically, so
/// downstream upserts dedup across repeated scrapes.
pub fn stable_external_id(summary: &ListingSummary) -> String {
	let mut hasher = Sha256::new();
	hasher.update(summary.loading_place.as_bytes());
	hasher.update(b"|");
	hasher.update(summary.unloading_place.as_bytes());
	hasher.update(b"|");
	hasher.update(summary.loading_date.as_deref().unwrap_or("").as_bytes());
	hasher.update(b"|");
	hasher.update(summary.price_text.as_deref().unwrap_or("").as_bytes());
	let digest = hasher.finalize();
	let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
	format!("gen-{}", &hex[..16])
}

#[cfg(test)]
mod tests {
	use super::*;

	fn summary(loading: &str, unloading: &str, date: &str, price: &str) -> ListingSummary {
		ListingSummary {
			loading_place: loading.into(),
			unloading_place: unloading.into(),
			loading_date: Some(date.into()),
			price_text: Some(price.into()),
			..Default::default()
		}
	}

	#[test]
	fn external_id_is_deterministic() {
		let a = summary("SK 93101 Šamorín", "DE 10115 Berlin", "15.03.2026", "920 EUR");
		let b = summary("SK 93101 Šamorín", "DE 10115 Berlin", "15.03.2026", "920 EUR");
		assert_eq!(stable_external_id(&a), stable_external_id(&b));
	}

	#[test]
	fn external_id_distinguishes_listings() {
		let a = summary("SK 93101 Šamorín", "DE 10115 Berlin", "15.03.2026", "920 EUR");
		let b = summary("SK 93101 Šamorín", "DE 10115 Berlin", "15.03.2026", "940 EUR");
		let c = summary("PL 00-001 Warszawa", "DE 10115 Berlin", "15.03.2026", "920 EUR");
		let ids = [stable_external_id(&a), stable_external_id(&b), stable_external_id(&c)];
		assert_ne!(ids[0], ids[1]);
		assert_ne!(ids[0], ids[2]);
		assert_ne!(ids[1], ids[2]);
	}

	#[test]
	fn merge_prefers_native_id() {
		let record = ListingRecord::merge(
			Some("offer-81422".into()),
			summary("SK 93101 Šamorín", "DE 10115 Berlin", "15.03.2026", "920 EUR"),
			ListingDetail::default(),
		);
		assert_eq!(record.external_id, "offer-81422");
	}

	#[test]
	fn merge_falls_back_to_hash_for_blank_native_id() {
		let record = ListingRecord::merge(
			Some("  ".into()),
			summary("SK 93101 Šamorín", "DE 10115 Berlin", "15.03.2026", "920 EUR"),
			ListingDetail::default(),
		);
		assert!(record.external_id.starts_with("gen-"));
	}

	#[test]
	fn default_dates_fill_only_missing_bounds() {
		let today = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
		let spec = FilterSpec {
			destination: "DE, 10115".into(),
			loading_date_to: Some("15.03.2026".into()),
			..Default::default()
		}
		.with_default_dates(today);

		assert_eq!(spec.loading_date_to.as_deref(), Some("15.03.2026"));
		assert_eq!(spec.unloading_date_to.as_deref(), Some("15.03.2026"));
		assert_eq!(spec.loading_date_from, None);
	}

	#[test]
	fn default_dates_use_today_and_next_day() {
		let today = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
		let spec = FilterSpec::default().with_default_dates(today);
		assert_eq!(spec.loading_date_to.as_deref(), Some("14.03.2026"));
		assert_eq!(spec.unloading_date_to.as_deref(), Some("15.03.2026"));
	}

	#[test]
	fn weight_above_hundred_is_treated_as_kilograms() {
		let spec = FilterSpec {
			max_weight_tons: Some(24_000.0),
			..Default::default()
		};
		assert_eq!(spec.normalized_max_weight_tons(), Some(24.0));

		let spec = FilterSpec {
			max_weight_tons: Some(24.0),
			..Default::default()
		};
		assert_eq!(spec.normalized_max_weight_tons(), Some(24.0));
	}

	#[test]
	fn blank_origin_counts_as_absent() {
		let spec = FilterSpec {
			origin: Some("   ".into()),
			..Default::default()
		};
		assert!(!spec.has_origin());
	}
}
