//! # Mailflow インフラ層
//!
//! 外部システム（PostgreSQL）との接続・通信を担当する。
//!
//! ## 責務
//!
//! - **データベース接続**: PostgreSQL への接続プール管理
//! - **リポジトリ実装**: リストの永続化（List Store）
//! - **テスト用実装**: インメモリの Store（`test-utils` feature）
//!
//! ## 依存関係
//!
//! ```text
//! list-service → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`db`] - PostgreSQL データベース接続管理
//! - [`error`] - インフラ層エラー定義
//! - [`repository`] - リポジトリ実装
//! - `fake` - インメモリ実装（`test-utils` feature 有効時のみ）

pub mod db;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod fake;
pub mod repository;

pub use error::{InfraError, InfraErrorKind};
