//! Page-level helpers shared by the filter controller and extractor.

use std::time::Duration;

use chromiumoxide::{Element, Page};
use regex::Regex;

use crate::error::Result;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Sends Escape to the document. Used as the unconditional cleanup action:
/// it cancels stray pickers, calendars, and detail panels alike.
pub(crate) async fn send_escape(page: &Page) {
	if let Ok(body) = page.find_element("body").await {
		let _ = body.press_key("Escape").await;
	}
}

/// Polls `probe` every 200ms until it yields a value or `timeout_ms`
/// elapses.
pub(crate) async fn poll_until<T, F, Fut>(timeout_ms: u64, mut probe: F) -> Option<T>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Option<T>>,
{
	let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);
	loop {
		if let Some(value) = probe().await {
			return Some(value);
		}
		if tokio::time::Instant::now() >= deadline {
			return None;
		}
		tokio::time::sleep(POLL_INTERVAL).await;
	}
}

/// Current value of an input element.
pub(crate) async fn input_value(element: &Element) -> Result<String> {
	let returned = element
		.call_js_fn("function() { return this.value; }", false)
		.await?;
	Ok(returned
		.result
		.value
		.and_then(|v| v.as_str().map(str::to_string))
		.unwrap_or_default())
}

/// Clears an input and strips any readonly constraint so a value can be
/// typed into calendar-backed fields.
pub(crate) async fn prepare_input(element: &Element) -> Result<()> {
	element
		.call_js_fn(
			"function() { \
				this.removeAttribute('readonly'); \
				this.value = ''; \
				this.dispatchEvent(new Event('input', { bubbles: true })); \
			}",
			false,
		)
		.await?;
	Ok(())
}

/// Waits for document readiness up to `timeout_ms`. Returns false on
/// expiry; callers apply their fixed settle delay either way.
pub(crate) async fn wait_for_ready(page: &Page, timeout_ms: u64) -> bool {
	poll_until(timeout_ms, || async {
		let state = match page.evaluate("document.readyState").await {
			Ok(value) => value.into_value::<String>().unwrap_or_default(),
			Err(_) => String::new(),
		};
		(state == "complete").then_some(())
	})
	.await
	.is_some()
}

/// Last element under `selector` whose inner text matches `re`. The page
/// chrome can contain duplicate-looking controls; the functional one is
/// the last in document order.
pub(crate) async fn find_last_matching(page: &Page, selector: &str, re: &Regex) -> Option<Element> {
	let elements = page.find_elements(selector).await.unwrap_or_default();
	let mut texts = Vec::with_capacity(elements.len());
	for element in &elements {
		let text = element.inner_text().await.ok().flatten().unwrap_or_default();
		texts.push(text.trim().to_string());
	}
	let index = last_match_index(&texts, re)?;
	elements.into_iter().nth(index)
}

/// First element under `selector` whose inner text matches `re`.
pub(crate) async fn find_first_matching(page: &Page, selector: &str, re: &Regex) -> Option<Element> {
	let elements = page.find_elements(selector).await.unwrap_or_default();
	for element in elements {
		let text = element.inner_text().await.ok().flatten().unwrap_or_default();
		if re.is_match(text.trim()) {
			return Some(element);
		}
	}
	None
}

pub(crate) fn last_match_index(texts: &[String], re: &Regex) -> Option<usize> {
	let mut found = None;
	for (index, text) in texts.iter().enumerate() {
		if re.is_match(text) {
			found = Some(index);
		}
	}
	found
}
