// ========================================
// form_relay: 送信ペイロード
// ========================================

use crate::error::RelayError;
use reqwest::multipart::{Form, Part};

/// フィールドの値
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    File {
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: FieldValue,
}

/// 送信時点のフォーム内容
///
/// ブラウザのフォームエンコードと同じく、順序と重複した名前をそのまま保持する。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPayload {
    fields: Vec<FormField>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push(FormField {
            name: name.into(),
            value: FieldValue::Text(value.into()),
        });
    }

    pub fn push_file(
        &mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) {
        self.fields.push(FormField {
            name: name.into(),
            value: FieldValue::File {
                file_name: file_name.into(),
                content_type: content_type.into(),
                bytes,
            },
        });
    }

    /// 名前に対応する最初のテキスト値
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.iter().find_map(|field| match &field.value {
            FieldValue::Text(text) if field.name == name => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `name=value` 形式の文字列からペイロードを作る
    ///
    /// 値側の `=` はそのまま値に含める。名前が空、または `=` がない場合はエラー。
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, RelayError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut payload = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            match pair.split_once('=') {
                Some((name, value)) if !name.is_empty() => payload.push_text(name, value),
                _ => {
                    return Err(RelayError::InvalidForm(format!(
                        "expected name=value, got '{}'",
                        pair
                    )));
                }
            }
        }
        Ok(payload)
    }

    /// multipart/form-data 本文に変換
    pub fn into_multipart(self) -> Result<Form, RelayError> {
        let mut form = Form::new();
        for field in self.fields {
            form = match field.value {
                FieldValue::Text(text) => form.text(field.name, text),
                FieldValue::File {
                    file_name,
                    content_type,
                    bytes,
                } => {
                    // 空のファイル入力はブラウザと同じく application/octet-stream で送る
                    let mime = if content_type.is_empty() {
                        "application/octet-stream".to_string()
                    } else {
                        content_type
                    };
                    let part = Part::bytes(bytes)
                        .file_name(file_name)
                        .mime_str(&mime)
                        .map_err(|e| {
                            RelayError::InvalidForm(format!("bad content type '{}': {}", mime, e))
                        })?;
                    form.part(field.name, part)
                }
            };
        }
        Ok(form)
    }
}
