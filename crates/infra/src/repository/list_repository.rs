//! # ListRepository
//!
//! リスト（購読者セグメント）の永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **2 種類の一覧**: 購読者数を集計する重いクエリ（[`ListRepository::query_lists`]）と、
//!   集計しない軽いクエリ（[`ListRepository::find_all`]）を分ける
//! - **集計は呼び出し側**: 購読状態ごとの件数をそのまま返し、合計やタグの正規化は
//!   ユースケース層で行う
//! - **総件数は明示的に返す**: `COUNT(*) OVER()` で各行に載る総件数は、
//!   先頭行から取り出して [`ListQueryResult::total`] に移す
//! - **ORDER BY は列挙値から**: クライアント入力の文字列を SQL に埋め込まない

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mailflow_domain::list::{
    ListDraft,
    ListId,
    ListOptin,
    ListOrderBy,
    ListType,
    SortOrder,
    SubscriptionStatus,
};
use sqlx::{PgPool, types::Json};
use uuid::Uuid;

use crate::error::InfraError;

/// Store から取り出したリストのレコード
///
/// `tags` は DB 上 NULL の可能性があり、購読者数は状態別の件数のまま保持する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredList {
    pub id:                ListId,
    pub uuid:              Uuid,
    pub name:              String,
    pub list_type:         ListType,
    pub optin:             ListOptin,
    pub tags:              Option<Vec<String>>,
    pub description:       String,
    pub subscriber_counts: HashMap<SubscriptionStatus, i64>,
    pub created_at:        DateTime<Utc>,
    pub updated_at:        DateTime<Utc>,
}

/// 集計付き一覧クエリの条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// 指定時はその ID のリストのみ
    pub id:       Option<ListId>,
    /// 名前の部分一致（大文字小文字を区別しない）。空文字列は絞り込みなし
    pub search:   String,
    pub order_by: ListOrderBy,
    pub order:    SortOrder,
    pub offset:   i64,
    /// `None` は件数制限なし
    pub limit:    Option<i64>,
}

impl ListQuery {
    /// 単一のリストを引くためのクエリ
    pub fn by_id(id: ListId) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }
}

/// 集計付き一覧クエリの結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQueryResult {
    /// 現在のページに含まれるリスト
    pub lists: Vec<StoredList>,
    /// ページングを無視した総件数
    pub total: i64,
}

/// リストリポジトリトレイト
#[async_trait]
pub trait ListRepository: Send + Sync {
    /// 購読者数を状態別に集計した一覧を取得する
    async fn query_lists(&self, query: &ListQuery) -> Result<ListQueryResult, InfraError>;

    /// 全リストを集計なしで取得する（ID 昇順）
    ///
    /// `subscriber_counts` は常に空。
    async fn find_all(&self) -> Result<Vec<StoredList>, InfraError>;

    /// リストを作成し、作成後のレコードを返す
    async fn insert(&self, draft: &ListDraft) -> Result<StoredList, InfraError>;

    /// リストを更新し、更新後のレコードを返す
    ///
    /// 対象が存在しない場合は `InfraErrorKind::NotFound` を返す。
    async fn update(&self, id: ListId, draft: &ListDraft) -> Result<StoredList, InfraError>;

    /// 指定した ID のリストをまとめて削除し、削除件数を返す
    async fn delete_by_ids(&self, ids: &[ListId]) -> Result<u64, InfraError>;

    /// Store への疎通を確認する
    async fn ping(&self) -> Result<(), InfraError>;
}

/// PostgreSQL 実装の ListRepository
#[derive(Debug, Clone)]
pub struct PostgresListRepository {
    pool: PgPool,
}

impl PostgresListRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// `query_lists` の 1 行
#[derive(Debug, sqlx::FromRow)]
struct ListRow {
    total:               i64,
    id:                  i64,
    uuid:                Uuid,
    name:                String,
    list_type:           String,
    optin:               String,
    tags:                Option<Vec<String>>,
    description:         String,
    subscriber_statuses: Json<HashMap<String, i64>>,
    created_at:          DateTime<Utc>,
    updated_at:          DateTime<Utc>,
}

/// `find_all` の 1 行
#[derive(Debug, sqlx::FromRow)]
struct MinimalListRow {
    id:          i64,
    uuid:        Uuid,
    name:        String,
    list_type:   String,
    optin:       String,
    tags:        Option<Vec<String>>,
    description: String,
    created_at:  DateTime<Utc>,
    updated_at:  DateTime<Utc>,
}

impl TryFrom<MinimalListRow> for StoredList {
    type Error = InfraError;

    fn try_from(row: MinimalListRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id:                ListId::new(row.id).map_err(|e| InfraError::unexpected(e.to_string()))?,
            uuid:              row.uuid,
            name:              row.name,
            list_type:         parse_column(&row.list_type)?,
            optin:             parse_column(&row.optin)?,
            tags:              row.tags,
            description:       row.description,
            subscriber_counts: HashMap::new(),
            created_at:        row.created_at,
            updated_at:        row.updated_at,
        })
    }
}

impl TryFrom<ListRow> for StoredList {
    type Error = InfraError;

    fn try_from(row: ListRow) -> Result<Self, Self::Error> {
        let subscriber_counts = row
            .subscriber_statuses
            .0
            .into_iter()
            .map(|(status, count)| Ok((parse_column(&status)?, count)))
            .collect::<Result<HashMap<_, _>, InfraError>>()?;

        let mut list = Self::try_from(MinimalListRow {
            id:          row.id,
            uuid:        row.uuid,
            name:        row.name,
            list_type:   row.list_type,
            optin:       row.optin,
            tags:        row.tags,
            description: row.description,
            created_at:  row.created_at,
            updated_at:  row.updated_at,
        })?;
        list.subscriber_counts = subscriber_counts;
        Ok(list)
    }
}

/// DB の列挙値カラムをドメインの列挙型に変換する
fn parse_column<T>(value: &str) -> Result<T, InfraError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| InfraError::unexpected(format!("不正な列挙値 {value:?}: {e}")))
}

/// 集計付き一覧クエリの SQL を組み立てる
///
/// 並び替えカラムと方向は列挙値の静的文字列のみから埋め込む。
fn build_query_lists_sql(order_by: ListOrderBy, order: SortOrder) -> String {
    format!(
        r#"
        WITH ls AS (
            SELECT COUNT(*) OVER () AS total, l.*
            FROM lists l
            WHERE ($1::bigint IS NULL OR l.id = $1)
              AND ($2 = '' OR l.name ILIKE '%' || $2 || '%')
        ),
        counts AS (
            SELECT sl.list_id, sl.status::text AS status, COUNT(*)::bigint AS n
            FROM subscriber_lists sl
            WHERE sl.list_id IN (SELECT id FROM ls)
            GROUP BY sl.list_id, sl.status
        )
        SELECT
            ls.total,
            ls.id,
            ls.uuid,
            ls.name,
            ls.type::text AS list_type,
            ls.optin::text AS optin,
            ls.tags,
            COALESCE(ls.description, '') AS description,
            COALESCE(
                (SELECT JSONB_OBJECT_AGG(c.status, c.n) FROM counts c WHERE c.list_id = ls.id),
                '{{}}'::jsonb
            ) AS subscriber_statuses,
            COALESCE(
                (SELECT SUM(c.n) FROM counts c WHERE c.list_id = ls.id),
                0
            )::bigint AS subscriber_count,
            ls.created_at,
            ls.updated_at
        FROM ls
        ORDER BY {column} {direction}, ls.id ASC
        OFFSET $3
        LIMIT $4
        "#,
        column = match order_by {
            ListOrderBy::Type => "ls.type",
            other => other.as_column(),
        },
        direction = order.as_sql(),
    )
}

#[async_trait]
impl ListRepository for PostgresListRepository {
    #[tracing::instrument(skip_all, fields(id = ?query.id, order_by = query.order_by.as_column()))]
    async fn query_lists(&self, query: &ListQuery) -> Result<ListQueryResult, InfraError> {
        let sql = build_query_lists_sql(query.order_by, query.order);
        let rows: Vec<ListRow> = sqlx::query_as(&sql)
            .bind(query.id.map(|id| id.as_i64()))
            .bind(&query.search)
            .bind(query.offset)
            .bind(query.limit)
            .fetch_all(&self.pool)
            .await?;

        let total = rows.first().map_or(0, |row| row.total);
        let lists = rows
            .into_iter()
            .map(StoredList::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ListQueryResult { lists, total })
    }

    async fn find_all(&self) -> Result<Vec<StoredList>, InfraError> {
        let rows: Vec<MinimalListRow> = sqlx::query_as(
            r#"
            SELECT
                id,
                uuid,
                name,
                type::text AS list_type,
                optin::text AS optin,
                tags,
                COALESCE(description, '') AS description,
                created_at,
                updated_at
            FROM lists
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(StoredList::try_from).collect()
    }

    #[tracing::instrument(skip_all)]
    async fn insert(&self, draft: &ListDraft) -> Result<StoredList, InfraError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO lists (uuid, name, type, optin, tags, description)
            VALUES ($1, $2, $3::list_type, $4::list_optin, $5, $6)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(draft.name().as_str())
        .bind(draft.list_type().to_string())
        .bind(draft.optin().to_string())
        .bind(draft.tags())
        .bind(draft.description())
        .fetch_one(&self.pool)
        .await?;

        let id = ListId::new(id).map_err(|e| InfraError::unexpected(e.to_string()))?;
        self.fetch_one(id).await
    }

    #[tracing::instrument(skip_all, fields(%id))]
    async fn update(&self, id: ListId, draft: &ListDraft) -> Result<StoredList, InfraError> {
        let result = sqlx::query(
            r#"
            UPDATE lists
            SET name = $2,
                type = $3::list_type,
                optin = $4::list_optin,
                tags = $5,
                description = $6,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .bind(draft.name().as_str())
        .bind(draft.list_type().to_string())
        .bind(draft.optin().to_string())
        .bind(draft.tags())
        .bind(draft.description())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(InfraError::not_found("List", id.to_string()));
        }

        self.fetch_one(id).await
    }

    #[tracing::instrument(skip_all, fields(count = ids.len()))]
    async fn delete_by_ids(&self, ids: &[ListId]) -> Result<u64, InfraError> {
        let ids: Vec<i64> = ids.iter().map(ListId::as_i64).collect();
        let result = sqlx::query("DELETE FROM lists WHERE id = ANY($1)")
            .bind(&ids)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), InfraError> {
        crate::db::ping(&self.pool).await?;
        Ok(())
    }
}

impl PostgresListRepository {
    /// 集計付きで 1 件取得する。存在しなければ NotFound
    async fn fetch_one(&self, id: ListId) -> Result<StoredList, InfraError> {
        self.query_lists(&ListQuery::by_id(id))
            .await?
            .lists
            .into_iter()
            .next()
            .ok_or_else(|| InfraError::not_found("List", id.to_string()))
    }
}
