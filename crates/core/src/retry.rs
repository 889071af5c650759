//! Bounded fixed-delay retry used by session acquisition and every
//! filter-field operation. One uniform policy, no per-call tuning.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

/// Fixed attempt count and inter-attempt delay.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryPolicy {
	pub attempts: u32,
	pub delay_ms: u64,
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self {
			attempts: 3,
			delay_ms: 1_000,
		}
	}
}

impl RetryPolicy {
	pub fn delay(&self) -> Duration {
		Duration::from_millis(self.delay_ms)
	}
}

/// Runs `op` up to `policy.attempts` times, sleeping `policy.delay()`
/// between attempts. The final attempt's error is re-raised unchanged.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, label: &str, mut op: F) -> Result<T>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T>>,
{
	let attempts = policy.attempts.max(1);
	for attempt in 1..attempts {
		match op().await {
			Ok(value) => return Ok(value),
			Err(err) => {
				warn!(target = "scout", %label, attempt, error = %err, "attempt failed, retrying");
				tokio::time::sleep(policy.delay()).await;
			}
		}
	}
	op().await
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;

	use super::*;
	use crate::error::ScoutError;

	fn fast_policy(attempts: u32) -> RetryPolicy {
		RetryPolicy {
			attempts,
			delay_ms: 1,
		}
	}

	#[tokio::test]
	async fn succeeds_on_third_attempt() {
		let calls = Cell::new(0u32);
		let result = with_retry(fast_policy(3), "flaky", || {
			let calls = &calls;
			async move {
				calls.set(calls.get() + 1);
				if calls.get() < 3 {
					Err(ScoutError::Js("not yet".into()))
				} else {
					Ok(calls.get())
				}
			}
		})
		.await;

		assert_eq!(result.unwrap(), 3);
		assert_eq!(calls.get(), 3);
	}

	#[tokio::test]
	async fn exhaustion_reraises_last_error() {
		let calls = Cell::new(0u32);
		let result: Result<()> = with_retry(fast_policy(3), "doomed", || {
			let calls = &calls;
			async move {
				calls.set(calls.get() + 1);
				Err(ScoutError::Js(format!("failure {}", calls.get())))
			}
		})
		.await;

		assert_eq!(calls.get(), 3);
		match result {
			Err(ScoutError::Js(msg)) => assert_eq!(msg, "failure 3"),
			other => panic!("expected Js error, got {other:?}"),
		}
	}

	#[tokio::test]
	async fn first_success_short_circuits() {
		let calls = Cell::new(0u32);
		let result = with_retry(fast_policy(3), "steady", || {
			let calls = &calls;
			async move {
				calls.set(calls.get() + 1);
				Ok("done")
			}
		})
		.await;

		assert_eq!(result.unwrap(), "done");
		assert_eq!(calls.get(), 1);
	}
}
