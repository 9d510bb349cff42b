// ========================================
// form_relay: サーバ応答によるリダイレクト
// ========================================

use crate::error::RelayError;
use serde::Deserialize;

/// サーバ応答のうちリダイレクト判定に使う部分
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServerResponse {
    #[serde(default)]
    pub redirect: Option<String>,
}

impl ServerResponse {
    pub fn from_json(source: &str) -> Result<Self, RelayError> {
        serde_json::from_str(source).map_err(|e| RelayError::Response(e.to_string()))
    }
}

/// ページ遷移を行うもの
pub trait Navigator {
    fn navigate(&self, url: &str);
}

/// 応答に `redirect` があればそこへ遷移する
///
/// 空文字列は「なし」と同じ扱い。遷移した場合は `true`。
/// 送信処理からは呼ばれない。
pub fn redirect_if_needed<N: Navigator + ?Sized>(data: &ServerResponse, navigator: &N) -> bool {
    match data.redirect.as_deref() {
        Some(url) if !url.is_empty() => {
            log::info!("Redirecting to {}", url);
            navigator.navigate(url);
            true
        }
        _ => false,
    }
}
