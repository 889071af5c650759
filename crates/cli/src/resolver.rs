//! Origin resolution for the CLI: a fixed home base stands in for a live
//! vehicle-position feed.

use async_trait::async_trait;
use scout::{LocationResolver, Result, ScoutError};

pub struct StaticOriginResolver {
	home_base: Option<String>,
}

impl StaticOriginResolver {
	pub fn new(home_base: Option<String>) -> Self {
		Self { home_base }
	}
}

#[async_trait]
impl LocationResolver for StaticOriginResolver {
	async fn current_origin(&self) -> Result<String> {
		self.home_base
			.clone()
			.filter(|base| !base.trim().is_empty())
			.ok_or_else(|| ScoutError::Resolve("no home base configured".into()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn configured_home_base_resolves() {
		let resolver = StaticOriginResolver::new(Some("DE, 10115, Berlin".into()));
		assert_eq!(resolver.current_origin().await.unwrap(), "DE, 10115, Berlin");
	}

	#[tokio::test]
	async fn blank_home_base_is_an_error() {
		for base in [None, Some("   ".to_string())] {
			let resolver = StaticOriginResolver::new(base);
			assert!(resolver.current_origin().await.is_err());
		}
	}
}
