use std::fs::File;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Url;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, warn};

use crate::domain::RemoteKey;
use crate::error::HcpError;

pub const ENDPOINT_ENV: &str = "HCP_S3_ENDPOINT";

pub trait RemoteClient: Send + Sync {
    fn download(&self, key: &RemoteKey, destination: &mut File) -> Result<u64, HcpError>;
}

#[derive(Clone)]
pub struct S3HttpClient {
    client: Client,
    endpoint: Option<String>,
}

impl S3HttpClient {
    pub fn new() -> Result<Self, HcpError> {
        let endpoint = std::env::var(ENDPOINT_ENV)
            .ok()
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty());
        Self::with_endpoint(endpoint)
    }

    pub fn with_endpoint(endpoint: Option<String>) -> Result<Self, HcpError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("hcp-meg/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| HcpError::RemoteHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|err| HcpError::RemoteHttp(err.to_string()))?;
        Ok(Self { client, endpoint })
    }

    pub fn object_url(&self, key: &RemoteKey) -> Result<String, HcpError> {
        object_url(self.endpoint.as_deref(), key)
    }

    fn send_with_retries<F>(
        &self,
        mut make_req: F,
    ) -> Result<reqwest::blocking::Response, HcpError>
    where
        F: FnMut() -> reqwest::blocking::RequestBuilder,
    {
        const MAX_RETRIES: usize = 3;
        const BASE_DELAY_MS: u64 = 500;
        let mut attempt = 0usize;
        loop {
            let response = make_req().send();
            match response {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if attempt < MAX_RETRIES && is_retryable_status(status) {
                        let delay = BASE_DELAY_MS * (attempt as u64 + 1);
                        warn!(status, attempt, "retrying remote request");
                        thread::sleep(Duration::from_millis(delay));
                        attempt += 1;
                        continue;
                    }
                    return Ok(resp);
                }
                Err(err) => {
                    if attempt < MAX_RETRIES && is_retryable_error(&err) {
                        let delay = BASE_DELAY_MS * (attempt as u64 + 1);
                        warn!(error = %err, attempt, "retrying remote request");
                        thread::sleep(Duration::from_millis(delay));
                        attempt += 1;
                        continue;
                    }
                    return Err(HcpError::RemoteHttp(err.to_string()));
                }
            }
        }
    }
}

impl RemoteClient for S3HttpClient {
    fn download(&self, key: &RemoteKey, destination: &mut File) -> Result<u64, HcpError> {
        let url = self.object_url(key)?;
        debug!(%url, "downloading object");
        let mut response = self.send_with_retries(|| self.client.get(&url))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "request failed".to_string());
            return Err(HcpError::RemoteStatus {
                key: key.to_string(),
                status,
                message,
            });
        }
        std::io::copy(&mut response, destination)
            .map_err(|err| HcpError::Filesystem(err.to_string()))
    }
}

pub fn object_url(endpoint: Option<&str>, key: &RemoteKey) -> Result<String, HcpError> {
    let (bucket, path) = key
        .as_str()
        .strip_prefix("s3://")
        .and_then(|rest| rest.split_once('/'))
        .filter(|(bucket, path)| !bucket.is_empty() && !path.is_empty())
        .ok_or_else(|| HcpError::InvalidBucketPrefix(key.to_string()))?;
    let (base, bucket_segment) = match endpoint {
        Some(endpoint) => (endpoint.to_string(), Some(bucket)),
        None => (format!("https://{bucket}.s3.amazonaws.com"), None),
    };
    let mut url = Url::parse(&base)
        .map_err(|err| HcpError::RemoteHttp(format!("invalid endpoint {base}: {err}")))?;
    url.path_segments_mut()
        .map_err(|_| HcpError::RemoteHttp(format!("endpoint {base} cannot carry a path")))?
        .pop_if_empty()
        .extend(bucket_segment)
        .extend(path.split('/'));
    Ok(url.into())
}

fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_hosted_url() {
        let key = RemoteKey::new(
            "s3://hcp-openaccess/HCP_900",
            "105923/unprocessed/MEG/3-Restin/4D/c,rfDC",
        );
        assert_eq!(
            object_url(None, &key).unwrap(),
            "https://hcp-openaccess.s3.amazonaws.com/HCP_900/105923/unprocessed/MEG/3-Restin/4D/c,rfDC"
        );
    }

    #[test]
    fn endpoint_override_uses_path_style() {
        let key = RemoteKey::new("s3://hcp-openaccess/HCP_900", "105923/MEG/a b#1.mat");
        assert_eq!(
            object_url(Some("http://localhost:9000/"), &key).unwrap(),
            "http://localhost:9000/hcp-openaccess/HCP_900/105923/MEG/a%20b%231.mat"
        );
    }

    #[test]
    fn non_s3_key_is_rejected() {
        let key = RemoteKey::new("https://example.org", "x");
        assert!(object_url(None, &key).is_err());
    }
}
