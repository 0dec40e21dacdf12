use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::{error::TransportError, model::UpstreamResponse};

/// Issues an outbound GET and hands back status plus body.
///
/// Shared by every in-flight request, so implementations must be `Send + Sync`.
#[async_trait]
pub trait HttpTransport: Send + Sync + Debug {
    async fn get(&self, url: Url) -> Result<UpstreamResponse, TransportError>;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: Url) -> Result<UpstreamResponse, TransportError> {
        let res = self.http.get(url).send().await?;
        let status = res.status().as_u16();

        // Reading the body consumes the response and releases the connection.
        let bytes = res.bytes().await?;
        let body = if bytes.is_empty() { None } else { Some(bytes.to_vec()) };

        Ok(UpstreamResponse { status, body })
    }
}
