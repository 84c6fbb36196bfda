//! HTTP client for the solicitação backend.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::types::{SolicitacaoBody, SolicitacaoDetailResponse, SolicitacaoResponse};

/// Backend operations needed by the worker.
///
/// The worker only sees this trait; tests drive it with a canned
/// implementation instead of a live server.
#[async_trait]
pub trait SolicitacaoApi: Send + Sync {
    /// Create a solicitação from the composed payload.
    async fn enviar_solicitacao(&self, body: &SolicitacaoBody) -> Result<SolicitacaoResponse>;
    /// Query the current state of a previously created solicitação.
    async fn consultar_solicitacao(&self, id: i64) -> Result<SolicitacaoDetailResponse>;
}

/// Production implementation over a shared `reqwest::Client`.
pub struct HttpApi {
    http: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl SolicitacaoApi for HttpApi {
    async fn enviar_solicitacao(&self, body: &SolicitacaoBody) -> Result<SolicitacaoResponse> {
        let resp = self
            .http
            .post(self.url("/api/solicitacoes"))
            .json(body)
            .send()
            .await?;
        decode_envelope(resp).await
    }

    async fn consultar_solicitacao(&self, id: i64) -> Result<SolicitacaoDetailResponse> {
        let resp = self
            .http
            .get(self.url(&format!("/api/solicitacoes/{id}")))
            .send()
            .await?;
        decode_envelope(resp).await
    }
}

/// Decode the backend envelope regardless of HTTP status.
///
/// The backend reports semantic failures inside the envelope (often with a
/// 4xx status), so the body is parsed first; only an unparseable body is
/// treated as a transport-level error.
async fn decode_envelope<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    let bytes = resp.bytes().await?;
    match serde_json::from_slice::<T>(&bytes) {
        Ok(parsed) => Ok(parsed),
        Err(e) => {
            let body = String::from_utf8_lossy(&bytes);
            if status.is_success() {
                Err(anyhow!("invalid response body: {e}: {body}"))
            } else {
                Err(anyhow!("HTTP status {status} error: {body}"))
            }
        }
    }
}
