// ========================================
// form_relay: フォーム送信インターセプタ
// ========================================

use crate::error::RelayError;
use crate::form::FormPayload;
use crate::http::{ResponseSummary, Transport};

/// フォームの送信イベント
///
/// ブラウザでは `submit` イベント、テストやCLIでは捕捉済みの値を持つ実装になる。
pub trait SubmitEvent {
    type Fields: FieldSource;

    /// ブラウザ既定の送信（ページ遷移）を止める
    fn prevent_default(&self);
    /// イベント対象フォームの `action`（送信先URL）
    fn target_action(&self) -> Result<String, RelayError>;
    /// 送信時点のフィールドを捕捉する
    fn fields(&self) -> Result<Self::Fields, RelayError>;
}

/// 捕捉したフィールドを送信ペイロードにまとめる
#[allow(async_fn_in_trait)]
pub trait FieldSource {
    async fn collect(self) -> Result<FormPayload, RelayError>;
}

impl FieldSource for FormPayload {
    async fn collect(self) -> Result<FormPayload, RelayError> {
        Ok(self)
    }
}

/// 既定動作を止めた後、送信を待っている1件分
#[derive(Debug, Clone)]
pub struct PendingSubmission<F> {
    pub action: String,
    pub fields: F,
}

/// 1回の送信の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// レスポンスを受信した（HTTPステータスは問わない）
    Responded(ResponseSummary),
    /// 送信できなかった
    Failed(RelayError),
}

/// フォームの送信を横取りして非同期POSTに置き換える
///
/// リトライ・キャンセル・多重送信の抑止は行わない。送信ごとに独立したPOSTになる。
#[derive(Debug, Clone)]
pub struct SubmitInterceptor<T> {
    transport: T,
}

impl<T: Transport> SubmitInterceptor<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// イベント発生時に同期的に呼ぶ部分
    ///
    /// 既定動作は必ず最初に止める。送信先やフィールドが取れなければ `None`。
    pub fn intercept<E: SubmitEvent>(&self, event: &E) -> Option<PendingSubmission<E::Fields>> {
        event.prevent_default();

        let action = match event.target_action() {
            Ok(action) => action,
            Err(e) => {
                log::error!("{}", e);
                return None;
            }
        };

        let fields = match event.fields() {
            Ok(fields) => fields,
            Err(e) => {
                log::error!("{}", e);
                return None;
            }
        };

        log::debug!("Intercepted submit to {}", action);
        Some(PendingSubmission { action, fields })
    }

    /// 捕捉済みの送信を実行し、結果を診断ログに書く
    pub async fn dispatch<F: FieldSource>(&self, pending: PendingSubmission<F>) -> SubmitOutcome {
        let payload = match pending.fields.collect().await {
            Ok(payload) => payload,
            Err(e) => {
                log::error!("{}", e);
                return SubmitOutcome::Failed(e);
            }
        };

        match self.transport.post(&pending.action, payload).await {
            Ok(response) => {
                log::info!("{:?}", response);
                SubmitOutcome::Responded(response)
            }
            Err(e) => {
                log::error!("{}", e);
                SubmitOutcome::Failed(e)
            }
        }
    }

    /// `intercept` と `dispatch` をまとめて行う
    pub async fn handle<E: SubmitEvent>(&self, event: &E) -> Option<SubmitOutcome> {
        let pending = self.intercept(event)?;
        Some(self.dispatch(pending).await)
    }
}

/// 値が確定済みの送信イベント（CLIやテスト用）
#[derive(Debug, Clone)]
pub struct CapturedSubmit {
    pub action: String,
    pub payload: FormPayload,
}

impl SubmitEvent for CapturedSubmit {
    type Fields = FormPayload;

    fn prevent_default(&self) {}

    fn target_action(&self) -> Result<String, RelayError> {
        if self.action.is_empty() {
            return Err(RelayError::InvalidForm("form has no action".to_string()));
        }
        Ok(self.action.clone())
    }

    fn fields(&self) -> Result<FormPayload, RelayError> {
        Ok(self.payload.clone())
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use log::{Level, Log, Metadata, Record};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::sync::Once;

    thread_local! {
        static RECORDS: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
    }

    /// このクレートのログをテストスレッドごとに記録するロガー
    struct CaptureLogger;

    impl Log for CaptureLogger {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.target().starts_with("form_relay")
        }

        fn flush(&self) {}

        fn log(&self, record: &Record) {
            if self.enabled(record.metadata()) {
                RECORDS.with(|r| r.borrow_mut().push((record.level(), record.args().to_string())));
            }
        }
    }

    static LOGGER: CaptureLogger = CaptureLogger;

    fn capture_logs() {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            log::set_logger(&LOGGER).ok();
            log::set_max_level(log::LevelFilter::Trace);
        });
        RECORDS.with(|r| r.borrow_mut().clear());
    }

    fn logged(level: Level) -> Vec<String> {
        RECORDS.with(|r| {
            r.borrow()
                .iter()
                .filter(|(l, _)| *l == level)
                .map(|(_, msg)| msg.clone())
                .collect()
        })
    }

    /// 送信内容を記録し、決められた結果を返すトランスポート
    #[derive(Clone)]
    struct RecordingTransport {
        calls: Rc<RefCell<Vec<(String, FormPayload)>>>,
        result: Result<u16, RelayError>,
    }

    impl RecordingTransport {
        fn replying(status: u16) -> Self {
            Self {
                calls: Rc::new(RefCell::new(Vec::new())),
                result: Ok(status),
            }
        }

        fn failing(msg: &str) -> Self {
            Self {
                calls: Rc::new(RefCell::new(Vec::new())),
                result: Err(RelayError::Transport(msg.to_string())),
            }
        }
    }

    impl Transport for RecordingTransport {
        async fn post(&self, url: &str, payload: FormPayload) -> Result<ResponseSummary, RelayError> {
            self.calls.borrow_mut().push((url.to_string(), payload));
            match &self.result {
                Ok(status) => Ok(ResponseSummary {
                    status: *status,
                    url: url.to_string(),
                    headers: vec![],
                }),
                Err(e) => Err(e.clone()),
            }
        }
    }

    /// ブラウザのフォームを模したイベント。値はイベント発生時に読む
    struct FakeFormEvent {
        action: RefCell<String>,
        fields: RefCell<Vec<(String, String)>>,
        prevented: Cell<u32>,
        broken_target: bool,
    }

    impl FakeFormEvent {
        fn new(action: &str, fields: &[(&str, &str)]) -> Self {
            Self {
                action: RefCell::new(action.to_string()),
                fields: RefCell::new(
                    fields
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                ),
                prevented: Cell::new(0),
                broken_target: false,
            }
        }
    }

    impl SubmitEvent for FakeFormEvent {
        type Fields = FormPayload;

        fn prevent_default(&self) {
            self.prevented.set(self.prevented.get() + 1);
        }

        fn target_action(&self) -> Result<String, RelayError> {
            if self.broken_target {
                return Err(RelayError::Dom("event target is not a form".to_string()));
            }
            Ok(self.action.borrow().clone())
        }

        fn fields(&self) -> Result<FormPayload, RelayError> {
            let mut payload = FormPayload::new();
            for (name, value) in self.fields.borrow().iter() {
                payload.push_text(name.as_str(), value.as_str());
            }
            Ok(payload)
        }
    }

    #[tokio::test]
    async fn test_submit_posts_fields_to_action() {
        let transport = RecordingTransport::replying(200);
        let interceptor = SubmitInterceptor::new(transport.clone());
        let event = FakeFormEvent::new("/search", &[("q", "hello")]);

        let outcome = interceptor.handle(&event).await.unwrap();

        assert_eq!(event.prevented.get(), 1);
        let calls = transport.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "/search");
        assert_eq!(calls[0].1.get("q"), Some("hello"));
        assert!(matches!(outcome, SubmitOutcome::Responded(ref r) if r.status == 200));
    }

    #[tokio::test]
    async fn test_network_failure_is_reported_not_raised() {
        let transport = RecordingTransport::failing("connection reset");
        let interceptor = SubmitInterceptor::new(transport.clone());
        let event = FakeFormEvent::new("/search", &[("q", "hello")]);

        let outcome = interceptor.handle(&event).await.unwrap();

        assert_eq!(event.prevented.get(), 1);
        assert_eq!(transport.calls.borrow().len(), 1);
        assert_eq!(
            outcome,
            SubmitOutcome::Failed(RelayError::Transport("connection reset".to_string()))
        );
    }

    #[tokio::test]
    async fn test_response_is_written_to_info_log() {
        capture_logs();
        let interceptor = SubmitInterceptor::new(RecordingTransport::replying(200));
        let event = FakeFormEvent::new("/search", &[("q", "hello")]);

        interceptor.handle(&event).await.unwrap();

        let info = logged(Level::Info);
        assert_eq!(info.len(), 1);
        assert!(info[0].contains("status: 200"));
        assert!(info[0].contains("/search"));
        assert!(logged(Level::Error).is_empty());
    }

    #[tokio::test]
    async fn test_network_failure_is_written_to_error_log_only() {
        capture_logs();
        let interceptor = SubmitInterceptor::new(RecordingTransport::failing("connection reset"));
        let event = FakeFormEvent::new("/search", &[("q", "hello")]);

        interceptor.handle(&event).await.unwrap();

        let errors = logged(Level::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("connection reset"));
        assert!(logged(Level::Info).is_empty());
    }

    #[tokio::test]
    async fn test_http_error_status_takes_success_path() {
        let interceptor = SubmitInterceptor::new(RecordingTransport::replying(503));
        let event = FakeFormEvent::new("/", &[("url", "example.com")]);

        let outcome = interceptor.handle(&event).await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Responded(ref r) if r.status == 503));
    }

    #[tokio::test]
    async fn test_default_is_prevented_even_when_capture_fails() {
        let transport = RecordingTransport::replying(200);
        let interceptor = SubmitInterceptor::new(transport.clone());
        let mut event = FakeFormEvent::new("/", &[]);
        event.broken_target = true;

        assert!(interceptor.handle(&event).await.is_none());
        assert_eq!(event.prevented.get(), 1);
        assert!(transport.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_fields_and_action_are_read_at_dispatch_time() {
        let transport = RecordingTransport::replying(200);
        let interceptor = SubmitInterceptor::new(transport.clone());
        let event = FakeFormEvent::new("/old", &[("url", "a.example")]);

        let first = interceptor.intercept(&event).unwrap();

        // 1回目の送信後にフォームが書き換えられる
        *event.action.borrow_mut() = "/new".to_string();
        event.fields.borrow_mut()[0].1 = "b.example".to_string();
        event.fields.borrow_mut().push(("key".to_string(), "abc".to_string()));
        let second = interceptor.intercept(&event).unwrap();

        interceptor.dispatch(first).await;
        interceptor.dispatch(second).await;

        let calls = transport.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "/old");
        assert_eq!(calls[0].1.get("url"), Some("a.example"));
        assert_eq!(calls[0].1.len(), 1);
        assert_eq!(calls[1].0, "/new");
        assert_eq!(calls[1].1.get("url"), Some("b.example"));
        assert_eq!(calls[1].1.get("key"), Some("abc"));
    }

    #[tokio::test]
    async fn test_rapid_submits_are_not_deduplicated() {
        let transport = RecordingTransport::replying(200);
        let interceptor = SubmitInterceptor::new(transport.clone());
        let event = FakeFormEvent::new("/", &[("url", "example.com")]);

        let a = interceptor.intercept(&event).unwrap();
        let b = interceptor.intercept(&event).unwrap();
        // 完了順は発行順と無関係
        interceptor.dispatch(b).await;
        interceptor.dispatch(a).await;

        assert_eq!(event.prevented.get(), 2);
        assert_eq!(transport.calls.borrow().len(), 2);
    }

    #[tokio::test]
    async fn test_captured_submit_requires_action() {
        let interceptor = SubmitInterceptor::new(RecordingTransport::replying(200));
        let event = CapturedSubmit {
            action: String::new(),
            payload: FormPayload::new(),
        };
        assert!(interceptor.handle(&event).await.is_none());
    }

    struct FailingFields;

    impl FieldSource for FailingFields {
        async fn collect(self) -> Result<FormPayload, RelayError> {
            Err(RelayError::InvalidForm("unreadable file".to_string()))
        }
    }

    #[tokio::test]
    async fn test_unreadable_fields_skip_the_request() {
        let transport = RecordingTransport::replying(200);
        let interceptor = SubmitInterceptor::new(transport.clone());

        let outcome = interceptor
            .dispatch(PendingSubmission {
                action: "/".to_string(),
                fields: FailingFields,
            })
            .await;

        assert!(matches!(outcome, SubmitOutcome::Failed(RelayError::InvalidForm(_))));
        assert!(transport.calls.borrow().is_empty());
    }
}
