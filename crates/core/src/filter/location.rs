//! Location picker flow.
//!
//! Each location field is driven through an explicit state machine: the
//! picker widget has several distinct phases and the failure handling
//! differs per phase, so the phase is tracked rather than inferred.

use std::sync::LazyLock;
use std::time::Duration;

use chromiumoxide::{Element, Page};
use regex::Regex;
use tracing::{debug, trace, warn};

use crate::config::EngineConfig;
use crate::error::{Result, ScoutError};
use crate::locator;
use crate::page;
use crate::suggest::{self, Candidate, Resolution};

/// Place text qualified enough for the radius dropdown to appear:
/// a two-letter country prefix, then digits (postal code), then a name.
static QUALIFIED_PLACE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[A-Za-z]{2}.*\d.*[A-Za-z]").unwrap());

/// Radius-shaped trigger or option text, e.g. "+ 50 km".
static RADIUS_TEXT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\+\s*\d+\s*km").unwrap());

/// Phases of one picker interaction. `Closed` is reachable from every
/// phase; all other transitions are strictly forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerState {
	Idle,
	FieldClicked,
	QueryTyped,
	SuggestionsVisible,
	Selected,
	RadiusOffered,
	RadiusSet,
	Closed,
}

impl PickerState {
	/// Legal forward edges of the picker flow.
	pub fn can_advance_to(self, next: PickerState) -> bool {
		use PickerState::*;
		matches!(
			(self, next),
			(_, Closed)
				| (Idle, FieldClicked)
				| (FieldClicked, QueryTyped)
				| (QueryTyped, SuggestionsVisible)
				| (SuggestionsVisible, Selected)
				| (Selected, RadiusOffered)
				| (RadiusOffered, RadiusSet)
		)
	}
}

/// A single location filter field identified by its container selector.
pub struct LocationField<'a> {
	pub label: &'static str,
	pub selector: &'a str,
}

/// Applies `value` to a location field, or clears it when `value` is
/// empty. Escape is sent on every exit path, success or failure, so a
/// half-open picker never leaks into the next field.
pub async fn set_location_field(
	page: &Page,
	config: &EngineConfig,
	field: &LocationField<'_>,
	value: Option<&str>,
) -> Result<()> {
	let outcome = drive_picker(page, config, field, value).await;
	advance(field.label, current_state_for_cleanup(&outcome), PickerState::Closed);
	page::send_escape(page).await;
	outcome.map(|_| ())
}

fn current_state_for_cleanup(outcome: &Result<PickerState>) -> PickerState {
	match outcome {
		Ok(state) => *state,
		Err(_) => PickerState::Idle,
	}
}

async fn drive_picker(
	page: &Page,
	config: &EngineConfig,
	field: &LocationField<'_>,
	value: Option<&str>,
) -> Result<PickerState> {
	let mut state = PickerState::Idle;

	// A picker left open by a previous field swallows the click.
	page::send_escape(page).await;

	let container = page
		.find_element(field.selector)
		.await
		.map_err(|_| ScoutError::ElementNotFound {
			selector: field.selector.to_string(),
		})?;
	let _ = container.scroll_into_view().await;

	let Some(query) = value.map(str::trim).filter(|v| !v.is_empty()) else {
		clear_field(page, field).await;
		return Ok(state);
	};

	container.click().await.map_err(|e| ScoutError::FieldSet {
		field: field.label.to_string(),
		reason: format!("container click failed: {e}"),
	})?;
	state = advance(field.label, state, PickerState::FieldClicked);

	let input = page::poll_until(config.picker_timeout_ms, || async {
		locator::find_first(page, locator::PICKER_INPUT)
			.await
			.map(|(element, _)| element)
	})
	.await
	.ok_or_else(|| ScoutError::Timeout {
		ms: config.picker_timeout_ms,
		condition: format!("{} picker input", field.label),
	})?;

	let _ = input.click().await;
	page::prepare_input(&input).await?;
	input.type_str(query).await?;
	state = advance(field.label, state, PickerState::QueryTyped);

	let elements = page::poll_until(config.suggestion_timeout_ms, || async {
		let found = locator::find_all_first(page, locator::SUGGESTION_ITEMS)
			.await
			.unwrap_or_default();
		(!found.is_empty()).then_some(found)
	})
	.await
	.unwrap_or_default();
	state = advance(field.label, state, PickerState::SuggestionsVisible);

	let candidates = read_candidates(&elements).await;
	match suggest::resolve(query, &candidates) {
		Resolution::Pick(position) => {
			let element = &elements[position];
			let _ = element.scroll_into_view().await;
			element.click().await.map_err(|e| ScoutError::FieldSet {
				field: field.label.to_string(),
				reason: format!("suggestion click failed: {e}"),
			})?;
		}
		Resolution::ConfirmDefault => {
			debug!(target = "scout", field = field.label, "no qualifying suggestion, confirming default");
			input.press_key("Enter").await?;
		}
	}
	state = advance(field.label, state, PickerState::Selected);
	tokio::time::sleep(Duration::from_millis(300)).await;

	let final_text = field_text(page, field).await.unwrap_or_default();
	if is_fully_qualified_place(&final_text) {
		state = advance(field.label, state, PickerState::RadiusOffered);
		if apply_radius(page, config).await {
			state = advance(field.label, state, PickerState::RadiusSet);
		}
	} else {
		debug!(
			target = "scout",
			field = field.label,
			text = %final_text,
			"place not fully qualified, skipping radius"
		);
	}

	Ok(state)
}

/// True when the resolved place carries country, postal code, and name,
/// which is the shape the radius dropdown is offered for.
pub fn is_fully_qualified_place(text: &str) -> bool {
	QUALIFIED_PLACE.is_match(text.trim())
}

fn advance(field: &str, from: PickerState, to: PickerState) -> PickerState {
	debug_assert!(from.can_advance_to(to), "illegal picker transition {from:?} -> {to:?}");
	trace!(target = "scout", field, from = ?from, to = ?to, "picker transition");
	to
}

async fn read_candidates(elements: &[Element]) -> Vec<Candidate> {
	let mut candidates = Vec::with_capacity(elements.len());
	for (position, element) in elements.iter().enumerate() {
		let text = element.inner_text().await.ok().flatten().unwrap_or_default();
		let text = text.trim().to_string();
		if text.is_empty() {
			continue;
		}
		candidates.push(Candidate { text, position });
	}
	candidates
}

/// Best-effort clear via the field's embedded clear button.
async fn clear_field(page: &Page, field: &LocationField<'_>) {
	let selector = format!("{} button", field.selector);
	match page.find_element(selector.as_str()).await {
		Ok(button) => {
			if button.click().await.is_err() {
				warn!(target = "scout", field = field.label, "clear button click failed");
			}
		}
		Err(_) => trace!(target = "scout", field = field.label, "no clear button present"),
	}
}

/// Reads the field's committed text after selection.
async fn field_text(page: &Page, field: &LocationField<'_>) -> Option<String> {
	let selector = format!("{} input", field.selector);
	if let Ok(input) = page.find_element(selector.as_str()).await {
		if let Ok(value) = page::input_value(&input).await {
			if !value.trim().is_empty() {
				return Some(value);
			}
		}
	}
	let container = page.find_element(field.selector).await.ok()?;
	container.inner_text().await.ok().flatten()
}

/// Selects the preferred radius option when the dropdown is offered.
/// Both steps are best effort; a missing dropdown is not an error.
async fn apply_radius(page: &Page, config: &EngineConfig) -> bool {
	if let Some(trigger) =
		page::find_first_matching(page, r#"button, [role="button"], [class*="radius"]"#, &RADIUS_TEXT).await
	{
		let _ = trigger.click().await;
		tokio::time::sleep(Duration::from_millis(300)).await;
	}

	let options = match locator::find_all_first(page, locator::RADIUS_OPTIONS).await {
		Ok(options) => options,
		Err(_) => return false,
	};
	for option in options {
		let text = option.inner_text().await.ok().flatten().unwrap_or_default();
		if text.contains(config.preferred_radius.trim()) {
			if option.click().await.is_ok() {
				debug!(target = "scout", radius = %config.preferred_radius, "radius applied");
				return true;
			}
			return false;
		}
	}
	false
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn qualified_place_requires_country_digits_and_name() {
		assert!(is_fully_qualified_place("DE 10115 Berlin"));
		assert!(is_fully_qualified_place("SK 93101 Šamorín"));
		assert!(is_fully_qualified_place("pl 00-001 Warszawa"));
		assert!(!is_fully_qualified_place("Berlin"));
		assert!(!is_fully_qualified_place("DE"));
		assert!(!is_fully_qualified_place("10115"));
		assert!(!is_fully_qualified_place(""));
	}

	#[test]
	fn radius_text_matches_offered_options() {
		assert!(RADIUS_TEXT.is_match("+ 75 km"));
		assert!(RADIUS_TEXT.is_match("+50 km"));
		assert!(!RADIUS_TEXT.is_match("75"));
		assert!(!RADIUS_TEXT.is_match("km"));
	}

	#[test]
	fn picker_transitions_follow_the_flow() {
		use PickerState::*;
		assert!(Idle.can_advance_to(FieldClicked));
		assert!(FieldClicked.can_advance_to(QueryTyped));
		assert!(QueryTyped.can_advance_to(SuggestionsVisible));
		assert!(SuggestionsVisible.can_advance_to(Selected));
		assert!(Selected.can_advance_to(RadiusOffered));
		assert!(RadiusOffered.can_advance_to(RadiusSet));
		// Closed is the escape hatch from anywhere.
		for state in [Idle, FieldClicked, QueryTyped, SuggestionsVisible, Selected, RadiusOffered, RadiusSet] {
			assert!(state.can_advance_to(Closed));
		}
		// No skipping phases.
		assert!(!Idle.can_advance_to(QueryTyped));
		assert!(!QueryTyped.can_advance_to(Selected));
		assert!(!Selected.can_advance_to(RadiusSet));
	}
}
