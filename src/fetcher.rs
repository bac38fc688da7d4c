use log::debug;
use reqwest::StatusCode;
use url::Url;

use crate::config::RegistryConfig;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Unexpected status code: {url} returned {status}")]
    Status { url: Url, status: StatusCode },
}

/// Source of registry pages addressed by record offset.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn fetch(&mut self, offset: usize) -> Result<String, TransportError>;
}

pub struct HttpPageSource {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpPageSource {
    pub fn new(config: &RegistryConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

impl PageSource for HttpPageSource {
    async fn fetch(&mut self, offset: usize) -> Result<String, TransportError> {
        let url = page_url(&self.base_url, offset);
        debug!("GET {url}");
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status { url, status });
        }
        Ok(response.text().await?)
    }
}

/// The first page is the bare base URL; later pages carry `start=<offset>`.
pub fn page_url(base_url: &Url, offset: usize) -> Url {
    let mut url = base_url.clone();
    if offset != 0 {
        url.query_pairs_mut()
            .append_pair("start", &offset.to_string());
    }
    url
}
