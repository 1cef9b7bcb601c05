//! # List Service 設定
//!
//! 環境変数から List Service サーバーの設定を読み込む。
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `LIST_SERVICE_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `LIST_SERVICE_PORT` | **Yes** | ポート番号 |
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//! | `APP_LANG` | No | メッセージの言語（`en` / `ja`、デフォルト: `en`） |
//! | `LIST_DEFAULT_PER_PAGE` | No | 一覧の 1 ページあたりのデフォルト件数（デフォルト: 20） |

use std::env;

use mailflow_shared::{Lang, i18n::I18nError, pagination::DEFAULT_PER_PAGE};
use thiserror::Error;

/// 設定読み込みのエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 必須の環境変数が未設定
    #[error("{0} が設定されていません")]
    Missing(&'static str),

    /// 環境変数の値が不正
    #[error("{name} の値が不正です: {value}")]
    Invalid { name: &'static str, value: String },

    /// 未対応の言語
    #[error(transparent)]
    Lang(#[from] I18nError),
}

/// List Service サーバーの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListServiceConfig {
    /// バインドアドレス
    pub host:             String,
    /// ポート番号
    pub port:             u16,
    /// データベース接続 URL
    pub database_url:     String,
    /// エラーメッセージの言語
    pub lang:             Lang,
    /// `per_page` 未指定時の件数
    pub default_per_page: i64,
}

impl ListServiceConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の取得関数から設定を読み込む
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));

        let port = required("LIST_SERVICE_PORT")?;
        let port = port.parse().map_err(|_| ConfigError::Invalid {
            name:  "LIST_SERVICE_PORT",
            value: port,
        })?;

        let default_per_page = match lookup("LIST_DEFAULT_PER_PAGE") {
            Some(value) => value
                .parse::<i64>()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or(ConfigError::Invalid {
                    name: "LIST_DEFAULT_PER_PAGE",
                    value,
                })?,
            None => DEFAULT_PER_PAGE,
        };

        Ok(Self {
            host: lookup("LIST_SERVICE_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            database_url: required("DATABASE_URL")?,
            lang: lookup("APP_LANG").as_deref().unwrap_or("en").parse()?,
            default_per_page,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ListServiceConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ListServiceConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_必須項目だけでデフォルト値が補われる() {
        let config = load(&[
            ("LIST_SERVICE_PORT", "3100"),
            ("DATABASE_URL", "postgres://localhost/mailflow"),
        ])
        .unwrap();

        assert_eq!(
            config,
            ListServiceConfig {
                host:             "0.0.0.0".to_string(),
                port:             3100,
                database_url:     "postgres://localhost/mailflow".to_string(),
                lang:             Lang::En,
                default_per_page: 20,
            }
        );
    }

    #[test]
    fn test_任意項目を上書きできる() {
        let config = load(&[
            ("LIST_SERVICE_HOST", "127.0.0.1"),
            ("LIST_SERVICE_PORT", "8080"),
            ("DATABASE_URL", "postgres://db/mailflow"),
            ("APP_LANG", "ja"),
            ("LIST_DEFAULT_PER_PAGE", "50"),
        ])
        .unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.lang, Lang::Ja);
        assert_eq!(config.default_per_page, 50);
    }

    #[test]
    fn test_ポート未設定はエラー() {
        let err = load(&[("DATABASE_URL", "postgres://db")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("LIST_SERVICE_PORT")));
    }

    #[test]
    fn test_データベースurl未設定はエラー() {
        let err = load(&[("LIST_SERVICE_PORT", "3100")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn test_数値でないポートはエラー() {
        let err = load(&[
            ("LIST_SERVICE_PORT", "http"),
            ("DATABASE_URL", "postgres://db"),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                name: "LIST_SERVICE_PORT",
                ..
            }
        ));
    }

    #[test]
    fn test_未対応の言語はエラー() {
        let err = load(&[
            ("LIST_SERVICE_PORT", "3100"),
            ("DATABASE_URL", "postgres://db"),
            ("APP_LANG", "fr"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Lang(_)));
    }
}
