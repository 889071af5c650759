//! Browser session lifecycle.
//!
//! One long-lived, reconnectable CDP connection owned by an injectable
//! manager object. The handle is created lazily, reused across scrape
//! invocations, and torn down only by explicit detach. Detaching drops the
//! automation transport and nothing else: the browser window, and the
//! manually established login inside it, always survive.

mod launcher;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{Result, ScoutError};
use crate::retry::with_retry;

pub use launcher::{CdpVersionInfo, fetch_cdp_endpoint, find_browser_executable, launch_args, spawn_detached};

/// Live connection plus the active page.
pub struct SessionHandle {
	browser: Browser,
	page: Page,
	handler_task: JoinHandle<()>,
	closed: Arc<AtomicBool>,
}

impl SessionHandle {
	pub fn page(&self) -> &Page {
		&self.page
	}

	/// True when the transport is up and the page still answers.
	pub async fn is_live(&self) -> bool {
		if self.closed.load(Ordering::SeqCst) {
			return false;
		}
		self.page.url().await.is_ok()
	}

	/// Disconnects the automation client. Never sends a browser-close
	/// command; dropping the `Browser` only tears down the websocket.
	fn detach(self) {
		let SessionHandle {
			browser,
			handler_task,
			..
		} = self;
		handler_task.abort();
		drop(browser);
	}
}

/// Owns the one reusable session. Callers that share a manager must
/// serialize their invocations; `acquire` takes `&mut self` so two
/// in-process flows cannot interleave on the same handle.
pub struct SessionManager {
	config: EngineConfig,
	handle: Option<SessionHandle>,
}

impl SessionManager {
	pub fn new(config: EngineConfig) -> Self {
		Self {
			config,
			handle: None,
		}
	}

	/// Returns a live handle: the cached one when still connected,
	/// otherwise attach-or-spawn. Fails with a connection error only when
	/// the endpoint never becomes reachable.
	pub async fn acquire(&mut self) -> Result<&SessionHandle> {
		if let Some(handle) = self.handle.take() {
			if handle.is_live().await {
				debug!(target = "scout", "reusing cached session");
				self.handle = Some(handle);
			} else {
				warn!(target = "scout", "cached session lost, reconnecting");
				handle.detach();
			}
		}

		if self.handle.is_none() {
			let handle = self.connect().await?;
			self.handle = Some(handle);
		}

		match self.handle.as_ref() {
			Some(handle) => Ok(handle),
			None => Err(ScoutError::Connection("session handle missing after connect".into())),
		}
	}

	/// Detaches the automation client, leaving the browser running.
	pub fn release(&mut self) {
		if let Some(handle) = self.handle.take() {
			info!(target = "scout", "detaching from browser, window stays open");
			handle.detach();
		}
	}

	async fn connect(&self) -> Result<SessionHandle> {
		match self.attach().await {
			Ok(handle) => return Ok(handle),
			Err(err) => {
				info!(target = "scout", error = %err, "no attachable browser, spawning one");
			}
		}

		spawn_detached(self.config.cdp_port, &self.config.profile_dir)?;
		tokio::time::sleep(self.config.launch_wait()).await;

		with_retry(self.config.retry, "attach after launch", || self.attach())
			.await
			.map_err(|err| {
				ScoutError::Connection(format!(
					"browser never became reachable on port {}: {err}",
					self.config.cdp_port
				))
			})
	}

	async fn attach(&self) -> Result<SessionHandle> {
		let info = fetch_cdp_endpoint(self.config.cdp_port).await?;
		let (browser, mut handler) = Browser::connect(info.web_socket_debugger_url)
			.await
			.map_err(|e| ScoutError::Connection(format!("CDP connect failed: {e}")))?;

		let closed = Arc::new(AtomicBool::new(false));
		let closed_flag = Arc::clone(&closed);
		let handler_task = tokio::spawn(async move {
			while let Some(event) = handler.next().await {
				if event.is_err() {
					break;
				}
			}
			closed_flag.store(true, Ordering::SeqCst);
		});

		let page = match ensure_page(&browser, &self.config.entry_url).await {
			Ok(page) => page,
			Err(err) => {
				handler_task.abort();
				return Err(err);
			}
		};

		debug!(target = "scout", port = self.config.cdp_port, "session attached");
		Ok(SessionHandle {
			browser,
			page,
			handler_task,
			closed,
		})
	}
}

/// Picks an open tab, preferring one already on the entry host; creates a
/// tab when none exist and navigates blank tabs to the entry URL.
async fn ensure_page(browser: &Browser, entry_url: &str) -> Result<Page> {
	let pages = browser.pages().await?;
	let mut preferred = None;
	let mut fallback = None;

	for page in pages {
		let url = page.url().await.ok().flatten().unwrap_or_default();
		if same_host(&url, entry_url) {
			preferred = Some(page);
			break;
		}
		if fallback.is_none() {
			fallback = Some(page);
		}
	}

	let page = match preferred.or(fallback) {
		Some(page) => page,
		None => {
			debug!(target = "scout", "no open tabs, creating one");
			return Ok(browser.new_page(entry_url).await?);
		}
	};

	let url = page.url().await.ok().flatten().unwrap_or_default();
	if is_blank_tab(&url) {
		debug!(target = "scout", "blank tab, navigating to entry URL");
		page.goto(entry_url).await?;
		let _ = page.wait_for_navigation().await;
	}
	let _ = page.bring_to_front().await;
	Ok(page)
}

/// Freshly opened tabs the browser parks on an internal page.
fn is_blank_tab(url: &str) -> bool {
	let url = url.trim();
	url.is_empty()
		|| url == "about:blank"
		|| url.starts_with("chrome://new-tab")
		|| url.starts_with("chrome://newtab")
		|| url.starts_with("edge://newtab")
}

fn same_host(a: &str, b: &str) -> bool {
	fn host(url: &str) -> Option<&str> {
		let rest = url.strip_prefix("https://").or_else(|| url.strip_prefix("http://"))?;
		rest.split('/').next()
	}
	match (host(a), host(b)) {
		(Some(lhs), Some(rhs)) => lhs == rhs,
		_ => false,
	}
}
