//! ブラウザDOMとのつなぎ込み

use crate::action::ExternalAction;
use crate::config::{CONFIG_SCRIPT_ID, RelayConfig};
use crate::error::RelayError;
use crate::form::FormPayload;
use crate::interceptor::{FieldSource, SubmitEvent};
use crate::redirect::Navigator;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Event, File, FormData, HtmlFormElement};

pub(crate) fn js_error(context: &str, value: JsValue) -> RelayError {
    RelayError::Dom(format!("{}: {:?}", context, value))
}

/// ブラウザの `submit` イベント
pub struct DomSubmitEvent {
    event: Event,
}

impl DomSubmitEvent {
    pub fn new(event: Event) -> Self {
        Self { event }
    }

    fn form(&self) -> Result<HtmlFormElement, RelayError> {
        self.event
            .target()
            .and_then(|target| target.dyn_into::<HtmlFormElement>().ok())
            .ok_or_else(|| RelayError::Dom("submit event target is not a form".to_string()))
    }
}

impl SubmitEvent for DomSubmitEvent {
    type Fields = BrowserFields;

    fn prevent_default(&self) {
        self.event.prevent_default();
    }

    fn target_action(&self) -> Result<String, RelayError> {
        // form.action は解決済みの絶対URLを返す
        Ok(self.form()?.action())
    }

    fn fields(&self) -> Result<BrowserFields, RelayError> {
        BrowserFields::from_form(&self.form()?)
    }
}

/// 送信時点で固定した `FormData`
pub struct BrowserFields {
    data: FormData,
}

impl BrowserFields {
    pub fn from_form(form: &HtmlFormElement) -> Result<Self, RelayError> {
        let data = FormData::new_with_form(form).map_err(|e| js_error("FormData", e))?;
        Ok(Self { data })
    }
}

impl FieldSource for BrowserFields {
    async fn collect(self) -> Result<FormPayload, RelayError> {
        let entries = js_sys::try_iter(&self.data)
            .map_err(|e| js_error("FormData entries", e))?
            .ok_or_else(|| RelayError::Dom("FormData is not iterable".to_string()))?;

        let mut payload = FormPayload::new();
        for entry in entries {
            let entry = js_sys::Array::from(&entry.map_err(|e| js_error("FormData entry", e))?);
            let name = entry.get(0).as_string().unwrap_or_default();
            let value = entry.get(1);

            if let Some(text) = value.as_string() {
                payload.push_text(name, text);
            } else if let Ok(file) = value.dyn_into::<File>() {
                let buffer = JsFuture::from(file.array_buffer())
                    .await
                    .map_err(|e| js_error("reading file", e))?;
                let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
                payload.push_file(name, file.name(), file.type_(), bytes);
            }
        }
        Ok(payload)
    }
}

/// `window.location.href` への代入で遷移する
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn navigate(&self, url: &str) {
        let Some(window) = web_sys::window() else {
            log::error!("No window to navigate to {}", url);
            return;
        };
        if let Err(e) = window.location().set_href(url) {
            log::error!("Failed to navigate to {}: {:?}", url, e);
        }
    }
}

#[wasm_bindgen]
extern "C" {
    // ページのグローバルスコープで定義されている
    #[wasm_bindgen(catch, js_name = get_daily_paper)]
    fn get_daily_paper(flag: bool) -> Result<JsValue, JsValue>;
}

/// ページ側の `get_daily_paper(flag)`
pub struct DailyPaperAction;

impl ExternalAction for DailyPaperAction {
    fn call(&self, flag: bool) {
        if let Err(e) = get_daily_paper(flag) {
            log::error!("get_daily_paper({}) failed: {:?}", flag, e);
        }
    }
}

/// `data.redirect` をJSの真偽判定で読み、文字列に変換する
///
/// `{redirect: 1}` のような文字列以外の値も `String(value)` と同じ結果になる。
pub fn redirect_target(data: &JsValue) -> Option<String> {
    let value = js_sys::Reflect::get(data, &JsValue::from_str("redirect")).ok()?;
    if !value.is_truthy() {
        return None;
    }
    Some(
        value
            .as_string()
            .unwrap_or_else(|| String::from(value.unchecked_ref::<js_sys::Object>().to_string())),
    )
}

/// `<script id="form-relay-config" type="application/json">` から設定を読む
///
/// 要素がなければ `Ok(None)`。
pub fn load_page_config(document: &Document) -> Result<Option<RelayConfig>, RelayError> {
    let Some(element) = document.get_element_by_id(CONFIG_SCRIPT_ID) else {
        return Ok(None);
    };
    let source = element.text_content().unwrap_or_default();
    RelayConfig::from_json(&source).map(Some)
}
