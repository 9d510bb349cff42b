use std::fmt;

/// フォーム送信処理で発生するエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// ネットワーク/トランスポート層の失敗（HTTPステータスは含まない）
    Transport(String),
    /// フォーム内容を送信ペイロードに変換できない
    InvalidForm(String),
    /// セレクタやIDに対応するDOM要素が見つからない
    MissingElement(String),
    /// DOM APIの呼び出し失敗
    Dom(String),
    /// 設定の読み込み/解析の失敗
    Config(String),
    /// サーバ応答を解釈できない
    Response(String),
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayError::Transport(msg) => write!(f, "transport error: {}", msg),
            RelayError::InvalidForm(msg) => write!(f, "invalid form: {}", msg),
            RelayError::MissingElement(what) => write!(f, "element not found: {}", what),
            RelayError::Dom(msg) => write!(f, "dom error: {}", msg),
            RelayError::Config(msg) => write!(f, "config error: {}", msg),
            RelayError::Response(msg) => write!(f, "unexpected server response: {}", msg),
        }
    }
}

impl std::error::Error for RelayError {}

impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        RelayError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(e: serde_json::Error) -> Self {
        RelayError::Config(e.to_string())
    }
}
