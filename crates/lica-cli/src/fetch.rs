use std::fs;
use std::time::Duration;

use tokio::runtime::Runtime;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Reads source documents from local paths or `http(s)://` URLs. The tokio
/// runtime and http client are created on the first remote source and shared
/// by every later one.
#[derive(Default)]
pub struct SourceReader {
    remote: Option<Remote>,
}

struct Remote {
    runtime: Runtime,
    client: reqwest::Client,
}

impl SourceReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&mut self, source: &str) -> Result<String, String> {
        if is_remote(source) {
            let remote = self.remote()?;
            remote.runtime.block_on(fetch_text(&remote.client, source))
        } else {
            fs::read_to_string(source).map_err(|e| format!("Failed to read '{}': {}", source, e))
        }
    }

    fn remote(&mut self) -> Result<&Remote, String> {
        if self.remote.is_none() {
            let runtime = Runtime::new().map_err(|e| format!("Failed to start tokio runtime: {}", e))?;
            let client = {
                let _guard = runtime.enter();
                reqwest::Client::builder()
                    .timeout(FETCH_TIMEOUT)
                    .build()
                    .map_err(|e| format!("Failed to build http client: {}", e))?
            };
            self.remote = Some(Remote { runtime, client });
        }
        self.remote
            .as_ref()
            .ok_or_else(|| "http client unavailable".to_string())
    }

    #[cfg(test)]
    fn has_remote(&self) -> bool {
        self.remote.is_some()
    }
}

async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String, String> {
    tracing::info!("fetching {}", url);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| format!("Failed to fetch '{}': {}", url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!("Failed to fetch '{}': HTTP {}", url, status));
    }

    response
        .text()
        .await
        .map_err(|e| format!("Failed to read body of '{}': {}", url, e))
}
