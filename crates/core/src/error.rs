use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScoutError>;

/// Engine error taxonomy.
///
/// Only `Connection`/`BrowserLaunch` abort a scrape run. `FieldSet` and
/// `RowExtraction` are contained at the field/row level: the surrounding
/// loop logs them and continues with partial results.
#[derive(Debug, Error)]
pub enum ScoutError {
	#[error("session unavailable: {0}")]
	Connection(String),

	#[error("browser launch failed: {0}")]
	BrowserLaunch(String),

	#[error("filter field '{field}' could not be set: {reason}")]
	FieldSet { field: String, reason: String },

	#[error("row {index} extraction failed: {reason}")]
	RowExtraction { index: usize, reason: String },

	#[error("timeout after {ms}ms waiting for: {condition}")]
	Timeout { ms: u64, condition: String },

	#[error("element not found: {selector}")]
	ElementNotFound { selector: String },

	#[error("javascript evaluation failed: {0}")]
	Js(String),

	#[error("store operation failed: {0}")]
	Store(String),

	#[error("origin resolution failed: {0}")]
	Resolve(String),

	#[error(transparent)]
	Cdp(#[from] chromiumoxide::error::CdpError),

	#[error(transparent)]
	Http(#[from] reqwest::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

impl ScoutError {
	/// True when the error must abort the whole run rather than a single
	/// field or row.
	pub fn is_fatal(&self) -> bool {
		matches!(self, ScoutError::Connection(_) | ScoutError::BrowserLaunch(_))
	}
}
