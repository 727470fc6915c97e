//! Upstream release metadata over HTTP.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{bail, Context};
use reqwest::blocking::Client;
use tracing::debug;

use crate::config::NetworkSettings;
use crate::error::{DevopsError, Result};

use super::RetryPolicy;

/// Fetches the body of an upstream URL.
pub trait ReleaseSource {
    /// Fetch `url`, retrying transient failures. Non-success statuses are
    /// `NetworkFailure` errors.
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Fetches release metadata with `reqwest`, retrying with backoff.
pub struct HttpReleaseSource {
    client: Client,
    policy: RetryPolicy,
    token: Option<String>,
    sleep: Box<dyn Fn(Duration)>,
}

impl HttpReleaseSource {
    /// Create a source with the given per-attempt timeout and retry policy.
    pub fn new(timeout: Duration, policy: RetryPolicy, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            policy,
            token: None,
            sleep: Box::new(std::thread::sleep),
        })
    }

    /// Create a source from network settings, picking up the GitHub token
    /// from the configured environment variable.
    pub fn from_settings(network: &NetworkSettings) -> Result<Self> {
        let source = Self::new(
            network.timeout(),
            RetryPolicy::from_settings(network),
            &network.user_agent,
        )?;
        let token = std::env::var(&network.github_token_env)
            .ok()
            .filter(|t| !t.trim().is_empty());
        Ok(source.with_token(token))
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Replace the backoff sleep (for testing).
    pub fn with_sleep(mut self, sleep: impl Fn(Duration) + 'static) -> Self {
        self.sleep = Box::new(sleep);
        self
    }

    fn fetch_once(&self, url: &str) -> anyhow::Result<String> {
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send()?;

        if !response.status().is_success() {
            bail!("HTTP {} fetching {}", response.status(), url);
        }

        Ok(response.text()?)
    }
}

impl ReleaseSource for HttpReleaseSource {
    fn fetch(&self, url: &str) -> Result<String> {
        debug!("Fetching {}", url);
        self.policy.run(url, &*self.sleep, || {
            self.fetch_once(url)
                .map_err(|e| DevopsError::NetworkFailure {
                    url: url.to_string(),
                    message: format!("{:#}", e),
                })
        })
    }
}

/// Scripted release source for testing. Clones share state.
///
/// Unscripted URLs fail with a `NetworkFailure`.
#[derive(Debug, Clone, Default)]
pub struct MockReleaseSource {
    state: Rc<RefCell<MockState>>,
}

#[derive(Debug, Default)]
struct MockState {
    bodies: HashMap<String, std::result::Result<String, String>>,
    requests: Vec<String>,
}

impl MockReleaseSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`.
    pub fn serve(&self, url: &str, body: impl Into<String>) {
        self.state
            .borrow_mut()
            .bodies
            .insert(url.to_string(), Ok(body.into()));
    }

    /// Fail requests for `url` with `message`.
    pub fn fail(&self, url: &str, message: impl Into<String>) {
        self.state
            .borrow_mut()
            .bodies
            .insert(url.to_string(), Err(message.into()));
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.state.borrow().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.borrow().requests.len()
    }
}

impl ReleaseSource for MockReleaseSource {
    fn fetch(&self, url: &str) -> Result<String> {
        let mut state = self.state.borrow_mut();
        state.requests.push(url.to_string());
        match state.bodies.get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(message)) => Err(DevopsError::NetworkFailure {
                url: url.to_string(),
                message: message.clone(),
            }),
            None => Err(DevopsError::NetworkFailure {
                url: url.to_string(),
                message: "HTTP 404 Not Found".to_string(),
            }),
        }
    }
}
