//! # メッセージのローカライズ
//!
//! クライアントに返すエラーメッセージを言語別のカタログから引く。
//!
//! ## カタログ形式
//!
//! `i18n/{lang}.json` にフラットな `キー → テンプレート` の JSON を置き、
//! バイナリに埋め込む。テンプレート中の `{param}` は呼び出し時の引数で置換する。
//! 引数の値自体が `{key}` 形式の場合は、そのキーの翻訳で置換する。
//!
//! ```
//! use mailflow_shared::{Catalog, Lang, Localizer};
//!
//! let catalog = Catalog::new(Lang::En).unwrap();
//! assert_eq!(
//!     catalog.ts("errors.not_found", &[("name", "{terms.list}")]),
//!     "List not found."
//! );
//! ```
//!
//! キーが選択言語に無い場合は英語カタログ、それにも無い場合はキー自体を返す。

use std::{collections::HashMap, str::FromStr};

use thiserror::Error;

const EN_CATALOG: &str = include_str!("../i18n/en.json");
const JA_CATALOG: &str = include_str!("../i18n/ja.json");

/// ローカライズ処理のエラー
#[derive(Debug, Error)]
pub enum I18nError {
    /// 未対応の言語コード
    #[error("未対応の言語です: {0}")]
    UnsupportedLang(String),

    /// カタログ JSON の解析失敗
    #[error("カタログの解析に失敗しました: {0}")]
    Parse(#[from] serde_json::Error),
}

/// 対応言語
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lang {
    #[default]
    En,
    Ja,
}

impl Lang {
    fn source(&self) -> &'static str {
        match self {
            Self::En => EN_CATALOG,
            Self::Ja => JA_CATALOG,
        }
    }
}

impl FromStr for Lang {
    type Err = I18nError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "ja" => Ok(Self::Ja),
            other => Err(I18nError::UnsupportedLang(other.to_string())),
        }
    }
}

/// ユーザー向けメッセージを提供するトレイト
pub trait Localizer: Send + Sync {
    /// キーに対応するメッセージを返す
    fn t(&self, key: &str) -> String;

    /// キーに対応するテンプレートの `{param}` を置換して返す
    fn ts(&self, key: &str, params: &[(&str, &str)]) -> String;
}

/// JSON カタログによる [`Localizer`] 実装
#[derive(Debug, Clone)]
pub struct Catalog {
    lang:     Lang,
    messages: HashMap<String, String>,
    fallback: HashMap<String, String>,
}

impl Catalog {
    /// 埋め込みカタログから作成する
    pub fn new(lang: Lang) -> Result<Self, I18nError> {
        Self::from_json(lang, lang.source(), Lang::En.source())
    }

    /// 任意の JSON 文字列から作成する
    pub fn from_json(lang: Lang, messages: &str, fallback: &str) -> Result<Self, I18nError> {
        Ok(Self {
            lang,
            messages: serde_json::from_str(messages)?,
            fallback: serde_json::from_str(fallback)?,
        })
    }

    pub fn lang(&self) -> Lang {
        self.lang
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        self.messages
            .get(key)
            .or_else(|| self.fallback.get(key))
            .map(String::as_str)
    }
}

impl Localizer for Catalog {
    fn t(&self, key: &str) -> String {
        self.lookup(key).unwrap_or(key).to_string()
    }

    fn ts(&self, key: &str, params: &[(&str, &str)]) -> String {
        params
            .iter()
            .fold(self.t(key), |message, (name, value)| {
                let value = match value.strip_prefix('{').and_then(|v| v.strip_suffix('}')) {
                    Some(nested) => self.t(nested),
                    None => (*value).to_string(),
                };
                message.replace(&format!("{{{name}}}"), &value)
            })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_埋め込みカタログを読み込める() {
        assert!(Catalog::new(Lang::En).is_ok());
        assert!(Catalog::new(Lang::Ja).is_ok());
    }

    #[test]
    fn test_tでキーに対応するメッセージを返す() {
        let catalog = Catalog::new(Lang::Ja).unwrap();
        assert_eq!(catalog.t("lists.invalid_name"), "不正な名前です。");
    }

    #[test]
    fn test_tsで入れ子のキーを翻訳して置換する() {
        let catalog = Catalog::new(Lang::Ja).unwrap();
        assert_eq!(
            catalog.ts("errors.not_found", &[("name", "{terms.list}")]),
            "リストが見つかりません。"
        );
    }

    #[test]
    fn test_tsで通常の値はそのまま置換する() {
        let catalog = Catalog::new(Lang::En).unwrap();
        assert_eq!(
            catalog.ts("errors.invalid_fields", &[("name", "order_by")]),
            "Invalid fields: order_by"
        );
    }

    #[test]
    fn test_選択言語に無いキーは英語にフォールバックする() {
        let catalog =
            Catalog::from_json(Lang::Ja, r#"{}"#, r#"{"greeting": "Hello"}"#).unwrap();
        assert_eq!(catalog.t("greeting"), "Hello");
    }

    #[test]
    fn test_どこにも無いキーはキー自体を返す() {
        let catalog = Catalog::new(Lang::En).unwrap();
        assert_eq!(catalog.t("no.such.key"), "no.such.key");
    }

    #[test]
    fn test_言語コードを解析する() {
        assert_eq!("JA".parse::<Lang>().unwrap(), Lang::Ja);
        assert!(matches!(
            "fr".parse::<Lang>(),
            Err(I18nError::UnsupportedLang(_))
        ));
    }

    #[test]
    fn test_全言語のカタログが英語と同じキーを持つ() {
        let en: HashMap<String, String> = serde_json::from_str(EN_CATALOG).unwrap();
        let ja: HashMap<String, String> = serde_json::from_str(JA_CATALOG).unwrap();

        let mut en_keys: Vec<_> = en.keys().collect();
        let mut ja_keys: Vec<_> = ja.keys().collect();
        en_keys.sort();
        ja_keys.sort();
        assert_eq!(en_keys, ja_keys);
    }
}
