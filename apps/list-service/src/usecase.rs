//! # ユースケース層
//!
//! List Service のビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: Store とメッセージカタログを `Arc<dyn Trait>` で外部から注入
//! - **薄いハンドラ**: ハンドラは薄く保ち、検証と集計はユースケースに集約

pub mod list;

pub use list::{ListInput, ListUseCaseImpl, QueryListsInput};
