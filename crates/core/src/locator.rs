//! Data-driven locator fallback chains.
//!
//! The target UI drifts between revisions, so every lookup is an ordered
//! list of strategies evaluated until one yields an element. New selectors
//! are added to these tables, not to control flow.

use chromiumoxide::{Element, Page};
use tracing::trace;

use crate::error::Result;

/// One named CSS strategy in a fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatorStrategy {
	pub name: &'static str,
	pub selector: &'static str,
}

/// Active text input inside a freshly opened location picker.
pub const PICKER_INPUT: &[LocatorStrategy] = &[
	LocatorStrategy {
		name: "dialog-text-input",
		selector: r#"[role="dialog"] input[type="text"], [class*="MuiDialog"] input[type="text"]"#,
	},
	LocatorStrategy {
		name: "search-placeholder",
		selector: r#"input[placeholder*="Search"], input[placeholder*="Найти"], input[placeholder*="Szukaj"]"#,
	},
	LocatorStrategy {
		name: "focused-input",
		selector: "input:focus",
	},
];

/// Autocomplete suggestion rows.
pub const SUGGESTION_ITEMS: &[LocatorStrategy] = &[
	LocatorStrategy {
		name: "aria-option",
		selector: r#"[role="option"]"#,
	},
	LocatorStrategy {
		name: "ctx-option",
		selector: r#"[data-ctx="option"]"#,
	},
	LocatorStrategy {
		name: "suggestion-class",
		selector: r#"li[class*="suggestion"], div[class*="suggestion"]"#,
	},
	LocatorStrategy {
		name: "mui-list-item",
		selector: r#"div[class*="MuiListItem-root"]"#,
	},
];

/// Transient listing detail panel.
pub const DETAIL_PANEL: &[LocatorStrategy] = &[
	LocatorStrategy {
		name: "aria-dialog",
		selector: r#"[role="dialog"]"#,
	},
	LocatorStrategy {
		name: "drawer-class",
		selector: r#"[class*="drawer"]"#,
	},
	LocatorStrategy {
		name: "modal-class",
		selector: r#"[class*="modal"]"#,
	},
];

/// Result rows in the listing table.
pub const RESULT_ROWS: &[LocatorStrategy] = &[
	LocatorStrategy {
		name: "ctx-row",
		selector: r#"[data-ctx="row"]"#,
	},
	LocatorStrategy {
		name: "aria-row",
		selector: r#"div[role="row"]"#,
	},
];

/// Radius dropdown options offered after a fully qualified place is set.
pub const RADIUS_OPTIONS: &[LocatorStrategy] = &[
	LocatorStrategy {
		name: "list-option",
		selector: r#"li, [role="option"]"#,
	},
	LocatorStrategy {
		name: "select-option",
		selector: "select option",
	},
];

/// Returns the first element any strategy resolves, in table order.
pub async fn find_first(page: &Page, strategies: &[LocatorStrategy]) -> Option<(Element, &'static str)> {
	for strategy in strategies {
		if let Ok(element) = page.find_element(strategy.selector).await {
			trace!(target = "scout", strategy = strategy.name, "locator hit");
			return Some((element, strategy.name));
		}
	}
	None
}

/// Returns the first non-empty element set any strategy resolves.
pub async fn find_all_first(page: &Page, strategies: &[LocatorStrategy]) -> Result<Vec<Element>> {
	for strategy in strategies {
		let elements = page.find_elements(strategy.selector).await.unwrap_or_default();
		if !elements.is_empty() {
			trace!(
				target = "scout",
				strategy = strategy.name,
				count = elements.len(),
				"locator hit"
			);
			return Ok(elements);
		}
	}
	Ok(Vec::new())
}
