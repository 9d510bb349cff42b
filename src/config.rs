// ========================================
// form_relay: 設定
// ========================================

use crate::LogLevel;
use crate::error::RelayError;
use serde::Deserialize;

/// ページ内に埋め込む設定スクリプトのID
pub const CONFIG_SCRIPT_ID: &str = "form-relay-config";

/// バインド対象と動作の設定
///
/// 省略したキーはデフォルト値になる。未知のキーは無視する。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// 送信を横取りするフォームのCSSセレクタ（最初の一致のみ）
    pub form_selector: String,
    /// 「新しく聞く」ボタンの要素ID
    pub ask_new_button_id: String,
    /// クリック時に外部関数へ渡すフラグ
    pub ask_new_flag: bool,
    pub log_level: LogLevel,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            form_selector: "form".to_string(),
            ask_new_button_id: "ask-new-btn".to_string(),
            ask_new_flag: true,
            log_level: LogLevel::Info,
        }
    }
}

impl RelayConfig {
    /// JSON文字列から設定を読み込む
    pub fn from_json(source: &str) -> Result<Self, RelayError> {
        let config: RelayConfig = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// JSONファイルから設定を読み込む（ネイティブ専用）
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, RelayError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| RelayError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&source)
    }

    fn validate(&self) -> Result<(), RelayError> {
        if self.form_selector.trim().is_empty() {
            return Err(RelayError::Config("form_selector must not be empty".to_string()));
        }
        if self.ask_new_button_id.trim().is_empty() {
            return Err(RelayError::Config("ask_new_button_id must not be empty".to_string()));
        }
        Ok(())
    }
}
