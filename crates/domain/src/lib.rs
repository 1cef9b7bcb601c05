//! # Mailflow ドメイン層
//!
//! メーリングリスト（購読者セグメント）管理のドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **値オブジェクト**: ID や名前などのプリミティブをラップし、生成時に検証する
//! - **エンティティ**: 永続化されたリストを表現し、フィールドは getter 経由で公開する
//! - **ドメインエラー**: バリデーション違反を表現するエラー型
//!
//! ## 依存関係の方向
//!
//! ```text
//! list-service → infra → domain
//!       ↘                  ↑
//!         shared ──────────┘（依存しない）
//! ```
//!
//! ドメイン層はインフラ層（DB、HTTP）に一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`clock`] - 時刻プロバイダ
//! - [`error`] - ドメイン層で発生するエラーの定義
//! - [`list`] - リストエンティティと関連する値オブジェクト
//!
//! ## 使用例
//!
//! ```rust
//! use mailflow_domain::{DomainError, list::ListId};
//!
//! let id = ListId::new(42).unwrap();
//! assert_eq!(id.as_i64(), 42);
//!
//! let error = ListId::new(0).unwrap_err();
//! assert!(matches!(error, DomainError::Validation(_)));
//! ```

#[macro_use]
mod macros;

pub mod clock;
pub mod error;
pub mod list;

pub use error::DomainError;
