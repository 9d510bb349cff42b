pub mod action;
pub mod config;
pub mod error;
pub mod form;
pub mod http;
pub mod interceptor;
pub mod redirect;

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub mod wasm;
#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub mod wasm_entry;

use serde::Deserialize;

pub use action::{AskNewBinding, ExternalAction};
pub use config::RelayConfig;
pub use error::RelayError;
pub use form::{FieldValue, FormField, FormPayload};
pub use http::{ReqwestTransport, ResponseSummary, Transport};
pub use interceptor::{CapturedSubmit, FieldSource, PendingSubmission, SubmitEvent, SubmitInterceptor, SubmitOutcome};
pub use redirect::{Navigator, ServerResponse, redirect_if_needed};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,      // ログを一切表示しない（panicは除く）
    Error,    // エラーレベルのみ
    Warn,     // 警告レベル以上
    Info,     // 情報レベル以上
    Debug,    // デバッグレベル以上
    Trace,    // 全てのログ
}

impl LogLevel {
    /// `--log-level=` の値を解釈する
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "off" => Some(LogLevel::Off),
            "error" => Some(LogLevel::Error),
            "warn" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// ログレベルを初期化する関数
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logger(log_level: &LogLevel) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::sync::Once;

    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let mut builder = Builder::from_default_env();

        if matches!(log_level, LogLevel::Off) {
            // quietモードの場合、何も出力しない（panicは別途処理される）
            builder
                .filter_level(LevelFilter::Off)
                .format(|_, _| Ok(()))
                .try_init()
                .ok(); // エラーを無視
        } else {
            builder
                .filter_level(log_level.to_level_filter())
                // reqwest/hyperの接続ログを抑制
                .filter_module("hyper_util", LevelFilter::Warn)
                .filter_module("reqwest", LevelFilter::Warn)
                .format_timestamp_secs()
                .try_init()
                .ok(); // エラーを無視
        }
    });
}

/// ブラウザコンソール用のロガーを初期化する
#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub fn init_console_logger(log_level: &LogLevel) {
    let Some(level) = log_level.to_level_filter().to_level() else {
        return;
    };
    // 二重初期化はエラーになるだけなので無視する
    console_log::init_with_level(level).ok();
}
