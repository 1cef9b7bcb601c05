//! # List Service ライブラリ
//!
//! List Service のユースケース・ハンドラ・ルーター構築を公開する。
//! `main.rs` と結合テスト（`tests/`）の双方から利用する。

pub mod app_builder;
pub mod config;
pub mod error;
pub mod handler;
pub mod usecase;
