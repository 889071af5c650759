//! Label-anchored range inputs (date ranges, weight).
//!
//! These fields have no stable selectors, so matching elements are found
//! in the DOM by label text, tagged with a synthetic attribute, and then
//! addressed through that attribute from the driver.

use chromiumoxide::Page;
use tracing::{debug, trace};

use crate::config::EngineConfig;
use crate::error::{Result, ScoutError};
use crate::page;

/// One from/to input pair anchored to a visible label.
pub struct RangeField {
	pub label: &'static str,
	pub tag: &'static str,
	/// Placeholder fallback pattern when no label element matches.
	pub placeholder_hint: &'static str,
}

pub const LOADING_DATE: RangeField = RangeField {
	label: "Loading date",
	tag: "loading-date",
	placeholder_hint: "dd.mm",
};

pub const UNLOADING_DATE: RangeField = RangeField {
	label: "Unloading date",
	tag: "unloading-date",
	placeholder_hint: "dd.mm",
};

pub const WEIGHT: RangeField = RangeField {
	label: "Weight (t)",
	tag: "weight",
	placeholder_hint: "^t$|ton",
};

/// Writes the bounds of a range field. With a single tagged input only the
/// upper bound is written, matching panels that expose one "up to" box.
pub async fn set_range_field(
	page: &Page,
	config: &EngineConfig,
	field: &RangeField,
	from: Option<&str>,
	to: Option<&str>,
) -> Result<()> {
	if from.is_none() && to.is_none() {
		return Ok(());
	}

	let tagged = tag_inputs(page, field).await?;
	if tagged == 0 {
		return Err(ScoutError::ElementNotFound {
			selector: field.label.to_string(),
		});
	}
	trace!(target = "scout", field = field.label, tagged, "range inputs tagged");

	let assignments: Vec<(usize, &str)> = if tagged >= 2 {
		[(0usize, from), (1usize, to)]
			.into_iter()
			.filter_map(|(index, value)| value.map(|v| (index, v)))
			.collect()
	} else {
		to.or(from).map(|v| (0usize, v)).into_iter().collect()
	};

	for (index, value) in assignments {
		fill_bound(page, config, field, index, value).await?;
	}
	Ok(())
}

/// Tags up to two inputs scoped to the field's label with
/// `data-scout-range="{tag}-{i}"`, falling back to a placeholder scan.
/// Returns how many inputs were tagged.
async fn tag_inputs(page: &Page, field: &RangeField) -> Result<usize> {
	let label = serde_json::Value::String(field.label.to_string()).to_string();
	let hint = serde_json::Value::String(field.placeholder_hint.to_string()).to_string();
	let tag = serde_json::Value::String(field.tag.to_string()).to_string();
	let js = format!(
		r#"(() => {{
			const label = {label};
			const hint = new RegExp({hint}, "i");
			const tag = {tag};
			document.querySelectorAll("input[data-scout-range]").forEach((el) => {{
				if (el.getAttribute("data-scout-range").startsWith(tag + "-")) {{
					el.removeAttribute("data-scout-range");
				}}
			}});
			const leaves = Array.from(document.querySelectorAll("label, span, div, legend"))
				.filter((el) => el.children.length === 0 && el.textContent.trim() === label);
			let inputs = [];
			for (const leaf of leaves) {{
				const scope = leaf.closest("fieldset")
					|| (leaf.parentElement && leaf.parentElement.parentElement)
					|| leaf.parentElement;
				inputs = scope ? Array.from(scope.querySelectorAll("input")) : [];
				if (inputs.length) break;
			}}
			if (!inputs.length) {{
				inputs = Array.from(document.querySelectorAll("input"))
					.filter((el) => hint.test(el.placeholder || ""));
			}}
			inputs = inputs.slice(0, 2);
			inputs.forEach((el, i) => el.setAttribute("data-scout-range", tag + "-" + i));
			return inputs.length;
		}})()"#
	);
	let count: usize = page.evaluate(js).await?.into_value().map_err(|e| ScoutError::Js(e.to_string()))?;
	Ok(count)
}

async fn fill_bound(
	page: &Page,
	config: &EngineConfig,
	field: &RangeField,
	index: usize,
	value: &str,
) -> Result<()> {
	let selector = format!(r#"input[data-scout-range="{}-{}"]"#, field.tag, index);
	let input = page
		.find_element(selector.as_str())
		.await
		.map_err(|_| ScoutError::ElementNotFound { selector })?;

	let _ = input.click().await;
	page::prepare_input(&input).await?;
	input.type_str(value).await?;
	input.press_key("Enter").await?;
	debug!(target = "scout", field = field.label, index, value, "range bound written");

	// Date inputs pop a calendar overlay that would swallow the next click.
	page::send_escape(page).await;
	tokio::time::sleep(config.settle_delay() / 4).await;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn field_tags_are_distinct() {
		let tags = [LOADING_DATE.tag, UNLOADING_DATE.tag, WEIGHT.tag];
		let mut sorted = tags.to_vec();
		sorted.sort_unstable();
		sorted.dedup();
		assert_eq!(sorted.len(), tags.len());
	}

	#[test]
	fn label_literals_embed_safely_into_js() {
		// Labels travel into the tagging script as JSON string literals.
		for field in [&LOADING_DATE, &UNLOADING_DATE, &WEIGHT] {
			let encoded = serde_json::Value::String(field.label.to_string()).to_string();
			assert!(encoded.starts_with('"') && encoded.ends_with('"'));
			assert!(!field.label.contains('"'));
		}
	}
}
