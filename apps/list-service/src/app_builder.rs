//! # List Service アプリケーション構築
//!
//! State を受け取り、ルーターとミドルウェアを組み立てる。
//! `main.rs` はインフラ初期化とサーバー起動に集中する。

use std::sync::Arc;

use axum::{Router, routing::get};
use mailflow_shared::observability::{MakeRequestUuidV7, make_request_span};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::handler::{
    ListState,
    ReadinessState,
    create_list,
    delete_list,
    get_list,
    get_lists,
    health_check,
    readiness_check,
    update_list,
};

/// ルーターを構築する
///
/// Request ID + TraceLayer により、すべての HTTP リクエストに `request_id` が付与され
/// ログに自動注入される。
pub fn build_app(list_state: Arc<ListState>, readiness_state: Arc<ReadinessState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(
            Router::new()
                .route("/health/ready", get(readiness_check))
                .with_state(readiness_state),
        )
        .route("/api/lists", get(get_lists).post(create_list))
        .route(
            "/api/lists/{id}",
            get(get_list).put(update_list).delete(delete_list),
        )
        .with_state(list_state)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}
