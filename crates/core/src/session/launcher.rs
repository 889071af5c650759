//! Detached browser launch and CDP endpoint discovery.
//!
//! The spawned process is fully detached: it outlives this process and is
//! closed only by the human who owns the browser window.

use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, ScoutError};

/// `/json/version` response subset from the DevTools protocol.
#[derive(Debug, Deserialize)]
pub struct CdpVersionInfo {
	#[serde(rename = "webSocketDebuggerUrl")]
	pub web_socket_debugger_url: String,
	#[serde(rename = "Browser")]
	pub browser: Option<String>,
}

/// Resolves CDP version metadata from `/json/version` on `port`.
pub async fn fetch_cdp_endpoint(port: u16) -> Result<CdpVersionInfo> {
	let client = reqwest::Client::builder()
		.timeout(Duration::from_millis(800))
		.build()?;
	let mut last_error = "no response".to_string();

	for url in [
		format!("http://127.0.0.1:{port}/json/version"),
		format!("http://localhost:{port}/json/version"),
	] {
		let response = match client.get(&url).send().await {
			Ok(r) => r,
			Err(e) => {
				last_error = e.to_string();
				continue;
			}
		};
		if !response.status().is_success() {
			last_error = format!("unexpected status {}", response.status());
			continue;
		}
		let info: CdpVersionInfo = response.json().await?;
		debug!(target = "scout", browser = ?info.browser, "discovered debugging endpoint");
		return Ok(info);
	}

	Err(ScoutError::Connection(format!(
		"no debugging endpoint on port {port}: {last_error}"
	)))
}

/// Finds a Chromium-family executable: `$SCOUT_BROWSER` first, then
/// platform install paths, then `$PATH` lookup.
pub fn find_browser_executable() -> Option<String> {
	if let Ok(path) = std::env::var("SCOUT_BROWSER") {
		if Path::new(&path).exists() {
			return Some(path);
		}
	}

	let candidates: &[&str] = if cfg!(target_os = "macos") {
		&[
			"/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
			"/Applications/Chromium.app/Contents/MacOS/Chromium",
			"/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
		]
	} else if cfg!(target_os = "windows") {
		&[
			r"C:\Program Files\Google\Chrome\Application\chrome.exe",
			r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
			r"C:\Program Files\Microsoft\Edge\Application\msedge.exe",
			r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
		]
	} else {
		&[
			"google-chrome-stable",
			"google-chrome",
			"chromium-browser",
			"chromium",
			"/usr/bin/google-chrome-stable",
			"/usr/bin/google-chrome",
			"/usr/bin/chromium-browser",
			"/usr/bin/chromium",
			"/snap/bin/chromium",
		]
	};

	for candidate in candidates {
		if candidate.starts_with('/') || candidate.contains('\\') {
			if Path::new(candidate).exists() {
				return Some((*candidate).to_string());
			}
		} else if which::which(candidate).is_ok() {
			return Some((*candidate).to_string());
		}
	}

	None
}

/// Launch arguments binding the debugging port to the persistent profile.
pub fn launch_args(port: u16, profile_dir: &Path) -> Vec<String> {
	vec![
		format!("--remote-debugging-port={port}"),
		format!("--user-data-dir={}", profile_dir.display()),
		"--no-first-run".to_string(),
		"--no-default-browser-check".to_string(),
	]
}

/// Spawns the browser detached from this process. Returns as soon as the
/// process starts; the caller polls the endpoint for readiness.
pub fn spawn_detached(port: u16, profile_dir: &Path) -> Result<()> {
	let executable = find_browser_executable().ok_or_else(|| {
		ScoutError::BrowserLaunch(
			"no Chromium-family executable found; set SCOUT_BROWSER to a browser path".into(),
		)
	})?;
	std::fs::create_dir_all(profile_dir)?;

	let mut cmd = Command::new(&executable);
	cmd.args(launch_args(port, profile_dir))
		.stdin(Stdio::null())
		.stdout(Stdio::null())
		.stderr(Stdio::null());

	#[cfg(unix)]
	std::os::unix::process::CommandExt::process_group(&mut cmd, 0);

	cmd.spawn()
		.map_err(|e| ScoutError::BrowserLaunch(format!("failed to spawn {executable}: {e}")))?;
	debug!(target = "scout", %executable, port, "browser spawned detached");
	Ok(())
}
