// ========================================
// form_relay: 「新しく聞く」ボタン
// ========================================

/// ページ側で定義された外部関数の呼び出し口
pub trait ExternalAction {
    fn call(&self, flag: bool);
}

/// ボタンのクリックを外部関数に結びつける
#[derive(Debug, Clone)]
pub struct AskNewBinding<A> {
    action: A,
    flag: bool,
}

impl<A: ExternalAction> AskNewBinding<A> {
    pub fn new(action: A) -> Self {
        Self::with_flag(action, true)
    }

    pub fn with_flag(action: A, flag: bool) -> Self {
        Self { action, flag }
    }

    /// クリック1回につき外部関数を1回呼ぶ
    pub fn on_click(&self) {
        log::debug!("ask-new clicked, calling external action({})", self.flag);
        self.action.call(self.flag);
    }
}
