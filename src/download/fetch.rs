//! Artifact downloads.

use std::cell::RefCell;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use anyhow::{bail, Context};
use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::config::Settings;
use crate::error::{DevopsError, Result};
use crate::versions::RetryPolicy;

/// Saves a remote artifact to a local path.
pub trait Downloader {
    fn download(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Downloads over HTTP with `reqwest`, retrying with backoff.
pub struct HttpDownloader {
    client: Client,
    policy: RetryPolicy,
}

impl HttpDownloader {
    pub fn new(timeout: Duration, policy: RetryPolicy, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, policy })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            settings.timeouts.download(),
            RetryPolicy::from_settings(&settings.network),
            &settings.network.user_agent,
        )
    }

    fn download_once(&self, url: &str, dest: &Path) -> anyhow::Result<u64> {
        let mut response = self.client.get(url).send()?;
        if !response.status().is_success() {
            bail!("HTTP {} fetching {}", response.status(), url);
        }

        // Write to a sibling file first so a failed transfer never leaves a
        // truncated artifact at `dest`.
        let partial = partial_path(dest);
        let mut file = File::create(&partial)
            .with_context(|| format!("Failed to create {}", partial.display()))?;
        let saved = io::copy(&mut response, &mut file)
            .map_err(anyhow::Error::from)
            .and_then(|bytes| {
                drop(file);
                fs::rename(&partial, dest)
                    .with_context(|| format!("Failed to move download to {}", dest.display()))?;
                Ok(bytes)
            });
        if saved.is_err() {
            let _ = fs::remove_file(&partial);
        }
        saved
    }
}

impl Downloader for HttpDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        info!("Downloading {}", url);
        let bytes = self.policy.run(url, &std::thread::sleep, || {
            self.download_once(url, dest)
                .map_err(|e| DevopsError::NetworkFailure {
                    url: url.to_string(),
                    message: format!("{:#}", e),
                })
        })?;
        debug!("Saved {} bytes to {}", bytes, dest.display());
        Ok(())
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

/// Download recorder for testing. Writes a small placeholder file at each
/// destination. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockDownloader {
    state: Rc<RefCell<MockDownloads>>,
}

#[derive(Debug, Default)]
struct MockDownloads {
    fetched: Vec<(String, PathBuf)>,
    failing: Vec<String>,
}

impl MockDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail downloads of URLs containing `fragment`.
    pub fn fail_matching(&self, fragment: &str) {
        self.state.borrow_mut().failing.push(fragment.to_string());
    }

    /// URLs downloaded so far.
    pub fn urls(&self) -> Vec<String> {
        self.state
            .borrow()
            .fetched
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    /// (url, destination) pairs downloaded so far.
    pub fn downloads(&self) -> Vec<(String, PathBuf)> {
        self.state.borrow().fetched.clone()
    }
}

impl Downloader for MockDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let failing = self
            .state
            .borrow()
            .failing
            .iter()
            .any(|f| url.contains(f.as_str()));
        if failing {
            return Err(DevopsError::NetworkFailure {
                url: url.to_string(),
                message: "HTTP 404 Not Found".to_string(),
            });
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(dest, url.as_bytes())?;
        self.state
            .borrow_mut()
            .fetched
            .push((url.to_string(), dest.to_path_buf()));
        Ok(())
    }
}
