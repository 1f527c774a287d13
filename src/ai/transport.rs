//! provider 호출용 HTTP 전송 계층
//!
//! gateway는 "JSON을 POST하고 상태 코드와 본문을 받는다"만 필요합니다.
//! 테스트에서는 네트워크 대신 호출을 기록하는 mock을 주입합니다.

use crate::error::{BcError, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// HTTP 응답 원본 (상태 코드 + 본문)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// JSON 본문으로 POST 요청 전송
    ///
    /// # Errors
    ///
    /// 응답을 받지 못한 경우(타임아웃, 연결 거부, DNS 실패)에만
    /// [`BcError::TransportError`]를 반환합니다. 2xx가 아닌 상태 코드는 이 계층에서
    /// 에러가 아닙니다.
    async fn post_json(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<HttpReply>;
}

/// reqwest 기반 실제 전송 계층
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        Self::with_builder(Client::builder())
    }

    fn with_builder(builder: ClientBuilder) -> Result<Self> {
        let client = builder
            .user_agent(concat!("bcopilot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BcError::TransportError(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<HttpReply> {
        let mut request = self.client.post(url).timeout(timeout);

        // 헤더를 먼저 넣어야 .json()이 Content-Type을 중복으로 추가하지 않음
        for (key, value) in headers {
            request = request.header(key.as_str(), value.as_str());
        }
        let request = request.json(body);

        let response = request
            .send()
            .await
            .map_err(|e| BcError::TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| BcError::TransportError(e.to_string()))?;

        Ok(HttpReply { status, body })
    }
}
