//! # リストハンドラ
//!
//! リスト管理 API を提供する。
//!
//! ## エンドポイント
//!
//! - `GET /api/lists` - 集計付き一覧（`minimal=true` で集計なしの全件）
//! - `GET /api/lists/{id}` - リスト詳細
//! - `POST /api/lists` - リスト作成
//! - `PUT /api/lists/{id}` - リスト更新
//! - `DELETE /api/lists/{id}` - リスト削除
//!
//! ## 一覧のレスポンス
//!
//! 結果が 0 件の場合はページネーションのメタ情報を付けず `{"data": []}` を返す。
//!
//! `GET /api/lists/{id}` の `id` が正の整数でない場合は、
//! 詳細ではなく一覧として扱う。

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mailflow_domain::list::{List, ListId, ListOptin, ListType};
use mailflow_shared::{ApiResponse, PaginatedResponse, Pagination};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::CoreError,
    usecase::{ListInput, ListUseCaseImpl, QueryListsInput},
};

/// リスト API の共有状態
pub struct ListState {
    pub usecase:          ListUseCaseImpl,
    /// `per_page` 未指定時の件数
    pub default_per_page: i64,
}

// --- リクエスト/レスポンス型 ---

/// 一覧のクエリパラメータ
///
/// 不正な値をエラーにせず丸めるため、すべて文字列で受け取る。
#[derive(Debug, Default, Deserialize)]
pub struct ListsQuery {
    pub page:     Option<String>,
    pub per_page: Option<String>,
    pub query:    Option<String>,
    pub order_by: Option<String>,
    pub order:    Option<String>,
    pub minimal:  Option<String>,
}

/// リスト DTO
#[derive(Debug, Serialize)]
pub struct ListDto {
    pub id:               i64,
    pub uuid:             Uuid,
    pub name:             String,
    #[serde(rename = "type")]
    pub list_type:        ListType,
    pub optin:            ListOptin,
    pub tags:             Vec<String>,
    pub description:      String,
    pub subscriber_count: i64,
    pub created_at:       String,
    pub updated_at:       String,
}

impl From<List> for ListDto {
    fn from(list: List) -> Self {
        Self {
            id:               list.id().as_i64(),
            uuid:             *list.uuid(),
            name:             list.name().to_string(),
            list_type:        list.list_type(),
            optin:            list.optin(),
            tags:             list.tags().to_vec(),
            description:      list.description().to_string(),
            subscriber_count: list.subscriber_count(),
            created_at:       list.created_at().to_rfc3339(),
            updated_at:       list.updated_at().to_rfc3339(),
        }
    }
}

/// 一覧レスポンスの `data`
///
/// 0 件のときは空配列、それ以外はページネーション付き。
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ListsData {
    Page(PaginatedResponse<ListDto>),
    Empty([ListDto; 0]),
}

impl From<PaginatedResponse<List>> for ListsData {
    fn from(page: PaginatedResponse<List>) -> Self {
        if page.results.is_empty() {
            Self::Empty([])
        } else {
            Self::Page(page.map(ListDto::from))
        }
    }
}

/// リスト作成・更新リクエスト
///
/// 各フィールドは省略・`null` のどちらも受け付け、検証はユースケースで行う。
#[derive(Debug, Default, Deserialize)]
pub struct ListRequest {
    pub name:        Option<String>,
    #[serde(rename = "type")]
    pub list_type:   Option<String>,
    pub optin:       Option<String>,
    pub tags:        Option<Vec<String>>,
    pub description: Option<String>,
}

impl From<ListRequest> for ListInput {
    fn from(req: ListRequest) -> Self {
        Self {
            name:        req.name.unwrap_or_default(),
            list_type:   req.list_type,
            optin:       req.optin,
            tags:        req.tags.unwrap_or_default(),
            description: req.description,
        }
    }
}

/// 真偽値のクエリパラメータを解析する
///
/// `1, t, T, TRUE, true, True` を真、それ以外（解析できない値を含む）を偽とする。
pub fn parse_bool_flag(value: Option<&str>) -> bool {
    matches!(value, Some("1" | "t" | "T" | "TRUE" | "true" | "True"))
}

// --- ハンドラ ---

/// GET /api/lists
///
/// `minimal` が真なら集計なしの全件、それ以外は検索・並び替え・ページング付きの一覧。
#[tracing::instrument(skip_all)]
pub async fn get_lists(
    State(state): State<Arc<ListState>>,
    Query(query): Query<ListsQuery>,
) -> Result<Response, CoreError> {
    query_lists(&state, query).await
}

/// GET /api/lists/{id}
///
/// ## レスポンス
///
/// - `200 OK`: リスト詳細（エンベロープなし）
/// - `400 Bad Request`: リストが見つからない
#[tracing::instrument(skip_all, fields(%id))]
pub async fn get_list(
    State(state): State<Arc<ListState>>,
    Path(id): Path<String>,
    Query(query): Query<ListsQuery>,
) -> Result<Response, CoreError> {
    let Some(id) = ListId::parse(&id) else {
        return query_lists(&state, query).await;
    };

    let list = state.usecase.get_list(id).await?;
    let response = ApiResponse::new(ListDto::from(list));
    Ok((StatusCode::OK, Json(response)).into_response())
}

async fn query_lists(state: &ListState, query: ListsQuery) -> Result<Response, CoreError> {
    let page = if parse_bool_flag(query.minimal.as_deref()) {
        state.usecase.list_minimal().await?
    } else {
        let input = QueryListsInput {
            search:     query.query.unwrap_or_default(),
            order_by:   query.order_by,
            order:      query.order,
            pagination: Pagination::from_params(
                query.page.as_deref(),
                query.per_page.as_deref(),
                state.default_per_page,
            ),
        };
        state.usecase.query_lists(input).await?
    };

    let response = ApiResponse::new(ListsData::from(page));
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// POST /api/lists
///
/// ## レスポンス
///
/// - `200 OK`: 作成されたリスト
/// - `400 Bad Request`: 名前・区分・オプトイン方式が不正
#[tracing::instrument(skip_all)]
pub async fn create_list(
    State(state): State<Arc<ListState>>,
    Json(req): Json<ListRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let list = state.usecase.create_list(req.into()).await?;

    let response = ApiResponse::new(ListDto::from(list));
    Ok((StatusCode::OK, Json(response)))
}

/// PUT /api/lists/{id}
///
/// ## レスポンス
///
/// - `200 OK`: 更新後のリスト
/// - `400 Bad Request`: ID・入力値が不正、またはリストが見つからない
#[tracing::instrument(skip_all, fields(%id))]
pub async fn update_list(
    State(state): State<Arc<ListState>>,
    Path(id): Path<String>,
    Json(req): Json<ListRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let id = state.usecase.parse_id(&id)?;
    let list = state.usecase.update_list(id, req.into()).await?;

    let response = ApiResponse::new(ListDto::from(list));
    Ok((StatusCode::OK, Json(response)))
}

/// DELETE /api/lists/{id}
///
/// ## レスポンス
///
/// - `200 OK`: `{"data": true}`
/// - `400 Bad Request`: ID が不正
#[tracing::instrument(skip_all, fields(%id))]
pub async fn delete_list(
    State(state): State<Arc<ListState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, CoreError> {
    let ids = vec![state.usecase.parse_id(&id)?];
    state.usecase.delete_lists(&ids).await?;

    Ok((StatusCode::OK, Json(ApiResponse::new(true))))
}
