//! Extraction engine for a freight-exchange web UI.
//!
//! The engine drives a real, visible browser over the DevTools protocol:
//! a human logs into the platform once, and the engine reuses that session
//! to apply search filters and extract freight listings. The pipeline is
//! session acquisition ([`session`]), filter application ([`filter`]),
//! row extraction ([`extract`]), and persistence through the
//! [`scrape::ListingStore`] boundary, orchestrated by
//! [`scrape::ScrapeRunner`].

pub mod config;
pub mod error;
pub mod extract;
pub mod filter;
pub mod locator;
pub mod model;
mod page;
pub mod retry;
pub mod scrape;
pub mod session;
pub mod suggest;

pub use config::EngineConfig;
pub use error::{Result, ScoutError};
pub use model::{FilterSpec, ListingDetail, ListingRecord, ListingSummary};
pub use retry::{RetryPolicy, with_retry};
pub use scrape::{ListingStore, LocationResolver, ScrapeReport, ScrapeRunner, UpsertOutcome};
pub use session::{SessionHandle, SessionManager};
