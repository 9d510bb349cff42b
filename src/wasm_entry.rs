// WASM専用のエントリーポイント

use crate::action::AskNewBinding;
use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::http::ReqwestTransport;
use crate::interceptor::SubmitInterceptor;
use crate::redirect::{ServerResponse, redirect_if_needed};
use crate::wasm::dom::{self, BrowserNavigator, DailyPaperAction, DomSubmitEvent, js_error};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Document, DocumentReadyState, Event};

#[wasm_bindgen(start)]
pub fn main() {
    // パニック時のエラーメッセージをブラウザコンソールに表示
    console_error_panic_hook::set_once();

    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };

    // ログレベルは設定に含まれるので、ロガーより先に読む
    let loaded = dom::load_page_config(&document);
    let config = match &loaded {
        Ok(Some(config)) => config.clone(),
        _ => RelayConfig::default(),
    };
    crate::init_console_logger(&config.log_level);
    if let Err(e) = &loaded {
        log::error!("{}; falling back to defaults", e);
    }

    log::info!("form_relay starting...");
    when_document_ready(&document, move |document| bind_page(&document, &config));
}

/// ドキュメントの解析完了後に一度だけ `f` を実行する
fn when_document_ready<F>(document: &Document, f: F)
where
    F: FnOnce(Document) + 'static,
{
    if document.ready_state() != DocumentReadyState::Loading {
        f(document.clone());
        return;
    }

    let target = document.clone();
    let closure: Closure<dyn FnMut(Event)> = Closure::once(move |_event: Event| f(target));
    let options = AddEventListenerOptions::new();
    options.set_once(true);

    if let Err(e) = document.add_event_listener_with_callback_and_add_event_listener_options(
        "DOMContentLoaded",
        closure.as_ref().unchecked_ref(),
        &options,
    ) {
        log::error!("Failed to wait for DOMContentLoaded: {:?}", e);
    }
    closure.forget();
}

/// フォームとボタンにハンドラを登録する
pub fn bind_page(document: &Document, config: &RelayConfig) {
    match bind_form(document, &config.form_selector) {
        Ok(()) => log::info!("Submit handler bound to '{}'", config.form_selector),
        Err(e) => log::warn!("{}", e),
    }

    match bind_ask_new_button(document, &config.ask_new_button_id, config.ask_new_flag) {
        Ok(()) => log::info!("Click handler bound to #{}", config.ask_new_button_id),
        // ボタンのないページもある
        Err(e) => log::debug!("{}", e),
    }
}

fn bind_form(document: &Document, selector: &str) -> Result<(), RelayError> {
    let form = document
        .query_selector(selector)
        .map_err(|e| js_error("querySelector", e))?
        .ok_or_else(|| RelayError::MissingElement(selector.to_string()))?;

    let interceptor = SubmitInterceptor::new(ReqwestTransport::new());
    let closure = Closure::wrap(Box::new(move |event: Event| {
        let event = DomSubmitEvent::new(event);
        if let Some(pending) = interceptor.intercept(&event) {
            let interceptor = interceptor.clone();
            wasm_bindgen_futures::spawn_local(async move {
                interceptor.dispatch(pending).await;
            });
        }
    }) as Box<dyn FnMut(_)>);

    form.add_event_listener_with_callback("submit", closure.as_ref().unchecked_ref())
        .map_err(|e| js_error("submit listener", e))?;
    closure.forget();
    Ok(())
}

fn bind_ask_new_button(document: &Document, id: &str, flag: bool) -> Result<(), RelayError> {
    let button = document
        .get_element_by_id(id)
        .ok_or_else(|| RelayError::MissingElement(format!("#{}", id)))?;

    let binding = AskNewBinding::with_flag(DailyPaperAction, flag);
    let closure = Closure::wrap(Box::new(move |_event: Event| {
        binding.on_click();
    }) as Box<dyn FnMut(_)>);

    button
        .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
        .map_err(|e| js_error("click listener", e))?;
    closure.forget();
    Ok(())
}

/// JSから呼べる `redirect_if_needed(data)`
#[wasm_bindgen(js_name = redirect_if_needed)]
pub fn redirect_if_needed_js(data: JsValue) -> bool {
    let response = ServerResponse {
        redirect: dom::redirect_target(&data),
    };
    redirect_if_needed(&response, &BrowserNavigator)
}
