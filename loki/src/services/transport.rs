//! HTTP transport pushing records to the Loki push API

use async_trait::async_trait;
use std::time::Duration;

use crate::config::LokiConfig;
use crate::error::{LokiError, LokiResult};
use crate::payload::PushRequest;
use crate::traits::LokiTransport;
use shared::{component_debug, BasicAuth, Component};

/// Real transport backed by a reqwest client
pub struct RealLokiTransport {
    client: reqwest::Client,
    url: String,
    auth: Option<BasicAuth>,
}

impl RealLokiTransport {
    /// Create a transport posting to the full push `url`
    pub fn new(url: impl Into<String>, auth: Option<BasicAuth>, timeout: Duration) -> LokiResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            auth,
        })
    }

    /// Create a transport for the endpoint and timeout in `config`
    pub fn from_config(config: &LokiConfig, auth: Option<BasicAuth>) -> LokiResult<Self> {
        Self::new(config.push_url(), auth, config.timeout)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl LokiTransport for RealLokiTransport {
    async fn push(&self, request: &PushRequest) -> LokiResult<()> {
        let mut builder = self.client.post(&self.url).json(request);
        if let Some(auth) = &self.auth {
            builder = builder.basic_auth(&auth.username, Some(&auth.password));
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LokiError::Rejected {
                url: self.url.clone(),
                status: status.as_u16(),
                body,
            });
        }

        component_debug!(Component::LokiControl, "Pushed {} stream(s) to {}", request.streams.len(), self.url);
        Ok(())
    }
}
