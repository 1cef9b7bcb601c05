//! # List Service エラー定義
//!
//! List Service 固有のエラーと、HTTP レスポンスへの変換を定義する。
//!
//! | バリアント | ステータス |
//! |-----------|-----------|
//! | `Validation` | 400 |
//! | `NotFound` | 400 |
//! | `Database` | 500 |
//!
//! `Validation` / `NotFound` のメッセージはローカライズ済みの文字列で、
//! そのまま `detail` に入る。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mailflow_infra::InfraError;
use mailflow_shared::ErrorResponse;
use thiserror::Error;

/// List Service で発生するエラー
#[derive(Debug, Error)]
pub enum CoreError {
    /// 入力値の検証エラー
    #[error("不正な入力: {0}")]
    Validation(String),

    /// 対象のリストが存在しない
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// データベースエラー
    #[error("データベースエラー: {0}")]
    Database(#[from] InfraError),
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let body = match self {
            CoreError::Validation(msg) => ErrorResponse::validation_error(msg),
            CoreError::NotFound(msg) => ErrorResponse::not_found(msg),
            CoreError::Database(e) => {
                tracing::error!(
                    error = %e,
                    span_trace = %e.span_trace(),
                    "データベースエラー"
                );
                ErrorResponse::internal_error()
            }
        };

        let status =
            StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(body)).into_response()
    }
}
