// ========================================
// form_relay: HTTPトランスポート
// ========================================

use crate::error::RelayError;
use crate::form::FormPayload;

/// ログに出すレスポンスの要約
///
/// 本文は読まない。ステータスに関わらず成功として扱う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSummary {
    pub status: u16,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl ResponseSummary {
    pub fn from_response(response: &reqwest::Response) -> Self {
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        Self {
            status: response.status().as_u16(),
            url: response.url().to_string(),
            headers,
        }
    }
}

/// フォーム送信に使う非同期POST
///
/// `Err` はトランスポート層の失敗のみ。4xx/5xxは `Ok` で返す。
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn post(&self, url: &str, payload: FormPayload) -> Result<ResponseSummary, RelayError>;
}

/// reqwestによる実装（ネイティブはhyper、WASMはfetch）
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    async fn post(&self, url: &str, payload: FormPayload) -> Result<ResponseSummary, RelayError> {
        let form = payload.into_multipart()?;
        log::debug!("POST {}", url);

        let response = self.client.post(url).multipart(form).send().await?;
        Ok(ResponseSummary::from_response(&response))
    }
}
