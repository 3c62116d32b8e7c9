use std::error::Error;
use std::fs;
use std::time::Duration;
use log::info;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use url::Url;

/// Where the rendered job form comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupSource {
    File(String),
    Remote(Url),
}

impl MarkupSource {
    /// `http(s)` URLs are fetched, anything else is a local path.
    pub fn parse(location: &str) -> Self {
        match Url::parse(location) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => MarkupSource::Remote(url),
            _ => MarkupSource::File(location.to_string()),
        }
    }

    pub fn load(&self) -> Result<String, Box<dyn Error>> {
        match self {
            MarkupSource::File(path) => {
                info!("Reading form markup from {path}");
                Ok(fs::read_to_string(path)?)
            }
            MarkupSource::Remote(url) => {
                info!("Fetching form markup from {url}");
                fetch_blocking(url)
            }
        }
    }

    /// Same as `load`, for callers already on a tokio runtime.
    ///
    /// The blocking client owns a runtime of its own and must not be used from async code.
    pub async fn load_in_background(self) -> Result<String, Box<dyn Error>> {
        let html = tokio::task::spawn_blocking(move || self.load().map_err(|e| e.to_string()))
            .await??;
        Ok(html)
    }
}

pub fn fetch_blocking(url: &Url) -> Result<String, Box<dyn Error>> {
    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static("jobform/0.1"));

    let html = client
        .get(url.as_str())
        .headers(headers)
        .send()?
        .error_for_status()?
        .text()?;
    Ok(html)
}
