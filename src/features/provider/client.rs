use super::ProviderError;
use crate::config::{ProviderConfig, SecretString};
use curl::easy::{Easy2, Handler, List, WriteError};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Blocking HTTP GET, injectable so providers can be tested offline.
pub trait HttpClient: Send + Sync {
    fn get(&self, url: &Url) -> Result<Vec<u8>, ProviderError>;
}

#[derive(Default)]
struct BodyCollector {
    body: Vec<u8>,
    limit: u64,
    limit_reached: bool,
}

impl BodyCollector {
    fn new(limit: u64) -> Self {
        Self {
            body: Vec::new(),
            limit,
            limit_reached: false,
        }
    }
}

impl Handler for BodyCollector {
    fn write(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        let len = data.len() as u64;
        if self.limit > 0 && self.body.len() as u64 + len > self.limit {
            self.limit_reached = true;
            // Short write makes curl abort the transfer.
            return Ok(0);
        }
        self.body.extend_from_slice(data);
        Ok(data.len())
    }
}

/// [`HttpClient`] backed by libcurl. A fresh handle is used per request so
/// the client can be shared across threads.
#[derive(Clone, Debug)]
pub struct CurlClient {
    timeout: Duration,
    max_response_bytes: u64,
    api_key: Option<SecretString>,
}

impl CurlClient {
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            timeout: config.timeout(),
            max_response_bytes: config.max_response_bytes,
            api_key: config.api_key.clone(),
        }
    }

    fn perform(&self, url: &Url) -> Result<(u32, BodyCollector), curl::Error> {
        let mut easy = Easy2::new(BodyCollector::new(self.max_response_bytes));
        easy.url(url.as_str())?;
        easy.timeout(self.timeout)?;
        easy.follow_location(true)?;
        easy.accept_encoding("")?;

        let mut headers = List::new();
        headers.append("Accept: application/json")?;
        if let Some(key) = &self.api_key {
            headers.append(&format!("Authorization: Key {}", key.expose()))?;
        }
        easy.http_headers(headers)?;

        let result = easy.perform();
        let code = easy.response_code().unwrap_or(0);
        let collector = std::mem::take(easy.get_mut());
        match result {
            Ok(()) => Ok((code, collector)),
            Err(_) if collector.limit_reached => Ok((code, collector)),
            Err(err) => Err(err),
        }
    }
}

impl HttpClient for CurlClient {
    fn get(&self, url: &Url) -> Result<Vec<u8>, ProviderError> {
        debug!(url = %url, "provider request");
        let (code, collector) = self
            .perform(url)
            .map_err(|err| ProviderError::Http(err.to_string()))?;

        if collector.limit_reached {
            return Err(ProviderError::TooLarge {
                url: url.to_string(),
                limit: self.max_response_bytes,
            });
        }
        if code >= 400 {
            return Err(ProviderError::Status {
                code,
                url: url.to_string(),
            });
        }
        Ok(collector.body)
    }
}
