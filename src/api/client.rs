use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::models::{ConnectionDetails, Device, SessionData};
use crate::settings::ApiSettings;

/// Calls the BCI backend makes available to the host.
#[async_trait]
pub trait BrainApi: Send + Sync {
    /// `GET /`, used as a reachability check.
    async fn health(&self) -> Result<serde_json::Value>;

    /// `POST /register/`
    async fn register_device(&self, device: &Device) -> Result<ConnectionDetails>;

    /// `GET /last/session/{minutes}`: samples recorded in the trailing window.
    async fn last_session(&self, minutes: u32) -> Result<SessionData>;
}

#[derive(Debug, Clone)]
pub struct HttpBrainApi {
    client: Client,
    base_url: Url,
}

impl HttpBrainApi {
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        let base_url = Url::parse(&settings.base_url)
            .with_context(|| format!("invalid api base url {:?}", settings.base_url))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("api base url {} cannot be a base", base_url));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()
            .context("failed to build http client")?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, parts: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| anyhow!("api base url cannot be a base"))?;
            segments.pop_if_empty().extend(parts);
        }
        Ok(url)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await.context("failed to read response body")?;
        if !status.is_success() {
            return Err(http_error(status, &body));
        }
        serde_json::from_str(&body).context("failed to decode response body")
    }
}

fn http_error(status: StatusCode, body: &str) -> anyhow::Error {
    if body.trim().is_empty() {
        anyhow!("backend error: http {}", status.as_u16())
    } else {
        anyhow!("backend error: http {}; body={}", status.as_u16(), body.trim())
    }
}

#[async_trait]
impl BrainApi for HttpBrainApi {
    async fn health(&self) -> Result<serde_json::Value> {
        let url = self.endpoint(&[])?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;
        Self::decode(response).await
    }

    async fn register_device(&self, device: &Device) -> Result<ConnectionDetails> {
        let url = self.endpoint(&["register", ""])?;
        info!("Registering device {} ({})", device.serial_number, device.model.display_name());
        let response = self
            .client
            .post(url.clone())
            .json(device)
            .send()
            .await
            .with_context(|| format!("POST {} failed", url))?;
        Self::decode(response).await
    }

    async fn last_session(&self, minutes: u32) -> Result<SessionData> {
        let minutes = minutes.to_string();
        let url = self.endpoint(&["last", "session", &minutes])?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;
        let data: SessionData = Self::decode(response).await?;
        debug!(
            "Fetched {} scores and {} raw samples for the last {} minutes",
            data.scores.len(),
            data.raw.len(),
            minutes
        );
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base_url: &str) -> HttpBrainApi {
        HttpBrainApi::new(&ApiSettings {
            base_url: base_url.into(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn builds_backend_routes() {
        let api = api("http://localhost:8000");
        assert_eq!(api.endpoint(&[]).unwrap().as_str(), "http://localhost:8000/");
        assert_eq!(
            api.endpoint(&["register", ""]).unwrap().as_str(),
            "http://localhost:8000/register/"
        );
        assert_eq!(
            api.endpoint(&["last", "session", "340"]).unwrap().as_str(),
            "http://localhost:8000/last/session/340"
        );
    }

    #[test]
    fn keeps_base_path_prefix() {
        let api = api("https://bci.example.com/api/");
        assert_eq!(
            api.endpoint(&["last", "session", "15"]).unwrap().as_str(),
            "https://bci.example.com/api/last/session/15"
        );
    }

    #[test]
    fn rejects_unusable_base_urls() {
        for base_url in ["not a url", "mailto:brain@example.com"] {
            let settings = ApiSettings {
                base_url: base_url.into(),
                timeout_secs: 5,
            };
            assert!(HttpBrainApi::new(&settings).is_err(), "{base_url}");
        }
    }

    #[test]
    fn http_errors_carry_status_and_body() {
        let err = http_error(
            StatusCode::NOT_FOUND,
            r#"{"detail":"No data found for the specified time range"}"#,
        );
        let message = err.to_string();
        assert!(message.contains("404"));
        assert!(message.contains("No data found"));

        assert_eq!(
            http_error(StatusCode::BAD_GATEWAY, "  ").to_string(),
            "backend error: http 502"
        );
    }
}
