//! Pure text parsers for row summaries and detail panels.
//!
//! The listing table renders as free text, so everything here is anchored
//! on the place-line shape: `CC <postal> <name>`. Rows without two such
//! anchors are not listings and are skipped upstream.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{ListingDetail, ListingSummary};

/// Place line: two-letter country code, postal code, name.
static PLACE_ANCHOR: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[A-Z]{2}\s+\d+(?:-\d+)?\s+.+$").unwrap());

static WEIGHT: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(t|kg)\b").unwrap());

static LOADING_METERS: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*ldm\b").unwrap());

static BODY_TYPE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)(?:body type|type of body)\s*:?\s*([^\n]+)").unwrap());

static CAPACITY: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)(?:load capacity|capacity)\s*:?\s*([^\n]+)").unwrap());

static PAYMENT: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)payment terms?\s*:?\s*([^\n]+)").unwrap());

static DESCRIPTION_LABEL: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)additional description\s*:?\s*").unwrap());

/// Subsequent capitalized word at line start ends the description block.
static SECTION_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z][a-z]+").unwrap());

const CURRENCY_TOKENS: &[(&str, &str)] = &[
	("EUR", "EUR"),
	("USD", "USD"),
	("PLN", "PLN"),
	("CZK", "CZK"),
	("€", "EUR"),
	("$", "USD"),
	("zł", "PLN"),
];

/// Parses a row's inner text into a summary. Returns `None` when the text
/// does not contain two place anchors, which marks a non-listing row.
pub fn parse_summary(text: &str) -> Option<ListingSummary> {
	let lines: Vec<&str> = text
		.lines()
		.map(str::trim)
		.filter(|line| !line.is_empty())
		.collect();

	let anchors: Vec<usize> = lines
		.iter()
		.enumerate()
		.filter(|(_, line)| PLACE_ANCHOR.is_match(line))
		.map(|(index, _)| index)
		.take(2)
		.collect();
	let [loading_at, unloading_at] = anchors.as_slice() else {
		return None;
	};
	let (loading_at, unloading_at) = (*loading_at, *unloading_at);

	let loading_date = (loading_at + 1 != unloading_at)
		.then(|| lines.get(loading_at + 1))
		.flatten()
		.map(|line| line.to_string());
	let unloading_date = lines.get(unloading_at + 1).map(|line| line.to_string());

	let (price_text, currency) = lines
		.iter()
		.find_map(|line| currency_of(line).map(|cur| (line.to_string(), cur.to_string())))
		.map(|(text, cur)| (Some(text), Some(cur)))
		.unwrap_or((None, None));

	Some(ListingSummary {
		loading_place: lines[loading_at].to_string(),
		unloading_place: lines[unloading_at].to_string(),
		loading_date,
		unloading_date,
		price_text,
		currency,
		weight_kg: parse_weight_kg(text),
	})
}

/// Weight in kilograms from the first `N t` / `N kg` token.
pub fn parse_weight_kg(text: &str) -> Option<f64> {
	let caps = WEIGHT.captures(text)?;
	let value: f64 = caps[1].replace(',', ".").parse().ok()?;
	match caps[2].to_ascii_lowercase().as_str() {
		"t" => Some(value * 1000.0),
		_ => Some(value),
	}
}

/// Parses detail panel text. Every field is independent and optional;
/// an empty panel yields an all-`None` detail.
pub fn parse_detail(text: &str) -> ListingDetail {
	ListingDetail {
		body_type: capture_line(&BODY_TYPE, text),
		capacity_text: capture_line(&CAPACITY, text),
		loading_meters: LOADING_METERS
			.captures(text)
			.and_then(|caps| caps[1].replace(',', ".").parse().ok()),
		payment_terms: capture_line(&PAYMENT, text),
		additional_description: parse_description(text),
	}
}

fn capture_line(re: &Regex, text: &str) -> Option<String> {
	let value = re.captures(text)?.get(1)?.as_str().trim().to_string();
	(!value.is_empty()).then_some(value)
}

/// Collects description lines after the label until the next section
/// heading. The first line is always kept; a later line opening with a
/// capitalized word is treated as the next panel section.
fn parse_description(text: &str) -> Option<String> {
	let label = DESCRIPTION_LABEL.find(text)?;
	let rest = &text[label.end()..];

	let mut collected = Vec::new();
	for (index, line) in rest.lines().enumerate() {
		if index > 0 && SECTION_START.is_match(line.trim_start()) {
			break;
		}
		collected.push(line);
	}

	let description = collected.join("\n").trim().to_string();
	(!description.is_empty()).then_some(description)
}

fn currency_of(line: &str) -> Option<&'static str> {
	if !line.chars().any(|c| c.is_ascii_digit()) {
		return None;
	}
	CURRENCY_TOKENS
		.iter()
		.find(|(token, _)| line.contains(token))
		.map(|(_, normalized)| *normalized)
}

#[cfg(test)]
mod tests {
	use super::*;

	const ROW: &str = "SK 93101 Šamorín\n16.03.2026, 08:00 – 16:00\nDE 10115 Berlin\n17.03.2026, 10:00\nTarpaulin 24 t\n920 EUR\n";

	#[test]
	fn summary_reads_places_dates_and_price() {
		let summary = parse_summary(ROW).unwrap();
		assert_eq!(summary.loading_place, "SK 93101 Šamorín");
		assert_eq!(summary.unloading_place, "DE 10115 Berlin");
		assert_eq!(summary.loading_date.as_deref(), Some("16.03.2026, 08:00 – 16:00"));
		assert_eq!(summary.unloading_date.as_deref(), Some("17.03.2026, 10:00"));
		assert_eq!(summary.price_text.as_deref(), Some("920 EUR"));
		assert_eq!(summary.currency.as_deref(), Some("EUR"));
		assert_eq!(summary.weight_kg, Some(24_000.0));
	}

	#[test]
	fn rows_without_two_place_anchors_are_rejected() {
		assert!(parse_summary("Promoted offer\nSee details").is_none());
		assert!(parse_summary("DE 10115 Berlin\nno second place").is_none());
		assert!(parse_summary("").is_none());
	}

	#[test]
	fn adjacent_anchors_leave_loading_date_empty() {
		let summary = parse_summary("PL 00-001 Warszawa\nCZ 11000 Praha\n18.03.2026").unwrap();
		assert_eq!(summary.loading_date, None);
		assert_eq!(summary.unloading_date.as_deref(), Some("18.03.2026"));
	}

	#[test]
	fn currency_symbols_normalize() {
		let summary = parse_summary("FR 75001 Paris\nIT 00100 Roma\n1 050 €").unwrap();
		assert_eq!(summary.currency.as_deref(), Some("EUR"));
		let summary = parse_summary("PL 00-001 Warszawa\nPL 30-001 Kraków\n4500 zł").unwrap();
		assert_eq!(summary.currency.as_deref(), Some("PLN"));
	}

	#[test]
	fn currency_token_without_digits_is_not_a_price() {
		let summary = parse_summary("DE 10115 Berlin\nAT 1010 Wien\nEUR pallets accepted").unwrap();
		assert_eq!(summary.price_text, None);
		assert_eq!(summary.currency, None);
	}

	#[test]
	fn weight_units_convert_to_kilograms() {
		assert_eq!(parse_weight_kg("24 t"), Some(24_000.0));
		assert_eq!(parse_weight_kg("3,5 t"), Some(3_500.0));
		assert_eq!(parse_weight_kg("850 kg"), Some(850.0));
		assert_eq!(parse_weight_kg("no weight here"), None);
	}

	#[test]
	fn detail_reads_labeled_fields() {
		let text = "Body type: Tarpaulin\nLoad capacity: 24 t\n13.6 ldm\nPayment terms: 45 days\nAdditional description: Urgent load\nneeds straps\nContact Jan Kowalski";
		let detail = parse_detail(text);
		assert_eq!(detail.body_type.as_deref(), Some("Tarpaulin"));
		assert_eq!(detail.capacity_text.as_deref(), Some("24 t"));
		assert_eq!(detail.loading_meters, Some(13.6));
		assert_eq!(detail.payment_terms.as_deref(), Some("45 days"));
		assert_eq!(detail.additional_description.as_deref(), Some("Urgent load\nneeds straps"));
	}

	#[test]
	fn description_stops_at_next_section_heading() {
		let detail = parse_detail("Additional description: fragile goods\nkeep dry\nPayment terms: 30 days");
		assert_eq!(detail.additional_description.as_deref(), Some("fragile goods\nkeep dry"));
	}

	#[test]
	fn empty_panel_yields_empty_detail() {
		let detail = parse_detail("");
		assert_eq!(detail, ListingDetail::default());
	}
}
