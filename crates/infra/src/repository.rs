//! # リポジトリ実装
//!
//! ドメインの永続化操作をトレイトとして定義し、PostgreSQL 実装を提供する。
//!
//! ## 設計方針
//!
//! - **依存性逆転**: ユースケース層はトレイト（`Arc<dyn ListRepository>`）にのみ依存
//! - **データベース抽象化**: sqlx を使用し、PostgreSQL 固有の処理をカプセル化
//! - **テスタビリティ**: トレイト経由でインメモリ実装に差し替え可能

pub mod list_repository;

pub use list_repository::{
    ListQuery,
    ListQueryResult,
    ListRepository,
    PostgresListRepository,
    StoredList,
};
