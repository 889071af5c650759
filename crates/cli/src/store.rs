//! JSON-file listing store.
//!
//! Good enough for a single operator machine: the whole listing set lives
//! in one JSON array, rewritten on every insert. The external id is the
//! unique key; an id seen before is a no-op.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use scout::{ListingRecord, ListingStore, Result, ScoutError, UpsertOutcome};
use tracing::debug;

pub struct JsonFileStore {
	path: PathBuf,
	records: Mutex<Vec<ListingRecord>>,
}

impl JsonFileStore {
	/// Opens the store, loading any existing listing file.
	pub fn open(path: &Path) -> Result<Self> {
		let records = if path.exists() {
			let text = std::fs::read_to_string(path)?;
			serde_json::from_str(&text)
				.map_err(|e| ScoutError::Store(format!("unreadable listing file {}: {e}", path.display())))?
		} else {
			Vec::new()
		};
		debug!(target = "scout", path = %path.display(), existing = records.len(), "listing store opened");
		Ok(Self {
			path: path.to_path_buf(),
			records: Mutex::new(records),
		})
	}

	fn flush(&self, records: &[ListingRecord]) -> Result<()> {
		if let Some(parent) = self.path.parent() {
			if !parent.as_os_str().is_empty() {
				std::fs::create_dir_all(parent)?;
			}
		}
		let text = serde_json::to_string_pretty(records)?;
		std::fs::write(&self.path, text)?;
		Ok(())
	}
}

#[async_trait]
impl ListingStore for JsonFileStore {
	async fn upsert_by_external_id(&self, record: &ListingRecord) -> Result<UpsertOutcome> {
		let mut records = self
			.records
			.lock()
			.map_err(|_| ScoutError::Store("listing store lock poisoned".into()))?;

		if records.iter().any(|r| r.external_id == record.external_id) {
			return Ok(UpsertOutcome::Duplicate);
		}
		records.push(record.clone());
		self.flush(&records)?;
		Ok(UpsertOutcome::Inserted)
	}
}
