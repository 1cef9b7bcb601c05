//! # リスト（購読者セグメント）
//!
//! メーリングリストのエンティティと、その検証済み入力・並び替え条件を定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`List`] | リスト | 名前付きの購読者セグメント |
//! | [`ListDraft`] | リスト入力 | 作成・更新時に Store へ渡す検証済みの内容 |
//! | [`ListType`] | 公開区分 | `public` / `private` / `temporary` |
//! | [`ListOptin`] | オプトイン方式 | `single` / `double` |
//! | [`SubscriptionStatus`] | 購読状態 | 購読者数の集計キー |
//! | [`ListOrderBy`] | 並び替えカラム | 一覧クエリで許可されたカラムのみ |
//!
//! ## 不変条件
//!
//! - [`List::tags`] は常に配列（NULL は空配列に正規化済み）
//! - [`List::subscriber_count`] は購読状態ごとの件数の合計
//! - 並び替えカラムは [`ListOrderBy`] の列挙値からのみ生成される

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use uuid::Uuid;

use crate::DomainError;

/// 一般的なテキスト入力の最大長（UTF-8 バイト数）
pub const STD_INPUT_MAX_LEN: usize = 200;

// =========================================================================
// ListId
// =========================================================================

/// リスト ID（値オブジェクト）
///
/// Store が採番する連番。
///
/// # 不変条件
///
/// - 1 以上の正整数
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display)]
#[serde(try_from = "i64", into = "i64")]
#[display("{_0}")]
pub struct ListId(i64);

impl TryFrom<i64> for ListId {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ListId> for i64 {
    fn from(id: ListId) -> Self {
        id.0
    }
}

impl ListId {
    /// 指定した値からリスト ID を作成する
    ///
    /// # エラー
    ///
    /// 0 以下の場合は `DomainError::Validation` を返す。
    pub fn new(value: i64) -> Result<Self, DomainError> {
        if value < 1 {
            return Err(DomainError::Validation(format!(
                "リスト ID は 1 以上である必要があります: {value}"
            )));
        }
        Ok(Self(value))
    }

    /// パスパラメータなどの文字列から解析する
    ///
    /// 数値として解釈できない値や 0 以下の値は `None` を返す。
    pub fn parse(value: &str) -> Option<Self> {
        value.trim().parse::<i64>().ok().and_then(|v| Self::new(v).ok())
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

// =========================================================================
// ListName
// =========================================================================

define_validated_string! {
    /// リスト名（値オブジェクト）
    ///
    /// # バリデーション
    ///
    /// - 前後の空白を除去した上で空文字列ではない
    /// - 最大 [`STD_INPUT_MAX_LEN`] バイト（UTF-8）
    pub struct ListName {
        label: "リスト名",
        max_length: STD_INPUT_MAX_LEN,
    }
}

// =========================================================================
// ListType / ListOptin
// =========================================================================

/// リストの公開区分
///
/// 並び順は宣言順（DB の列挙型と同じ）。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize, IntoStaticStr, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ListType {
    /// 購読者が自分で購読できる
    Public,
    /// 管理者のみが購読者を追加できる
    #[default]
    Private,
    /// 一時的なセグメント
    Temporary,
}

impl FromStr for ListType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            "temporary" => Ok(Self::Temporary),
            _ => Err(DomainError::Validation(format!("不正なリスト区分: {s}"))),
        }
    }
}

/// オプトイン方式
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, IntoStaticStr, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ListOptin {
    /// 購読と同時に確定
    #[default]
    Single,
    /// 確認メールで確定
    Double,
}

impl FromStr for ListOptin {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(Self::Single),
            "double" => Ok(Self::Double),
            _ => Err(DomainError::Validation(format!("不正なオプトイン方式: {s}"))),
        }
    }
}

// =========================================================================
// SubscriptionStatus
// =========================================================================

/// リストに対する購読状態
///
/// Store が購読者数を状態別に集計する際のキー。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SubscriptionStatus {
    Unconfirmed,
    Confirmed,
    Unsubscribed,
}

// =========================================================================
// 並び替え条件
// =========================================================================

/// 一覧クエリで並び替えに使用できるカラム
///
/// SQL の ORDER BY 句はこの列挙値の [`as_column`](ListOrderBy::as_column)
/// からのみ組み立てる。クライアントが送った文字列をそのまま埋め込まない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ListOrderBy {
    Name,
    Type,
    SubscriberCount,
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl ListOrderBy {
    /// 許可されたカラム名の一覧
    pub const ALLOWED: [&'static str; 5] =
        ["name", "type", "subscriber_count", "created_at", "updated_at"];

    /// カラム名を返す
    pub fn as_column(&self) -> &'static str {
        self.into()
    }
}

impl FromStr for ListOrderBy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "type" => Ok(Self::Type),
            "subscriber_count" => Ok(Self::SubscriberCount),
            "created_at" => Ok(Self::CreatedAt),
            "updated_at" => Ok(Self::UpdatedAt),
            _ => Err(DomainError::Validation(format!(
                "並び替えできないカラム: {s}（許可: {}）",
                Self::ALLOWED.join(", ")
            ))),
        }
    }
}

/// 並び順
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// SQL キーワードを返す
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(DomainError::Validation(format!("不正な並び順: {s}"))),
        }
    }
}

// =========================================================================
// ListDraft
// =========================================================================

/// 作成・更新時に Store へ渡すリストの内容
///
/// ID・UUID・タイムスタンプは Store が採番するため含まない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListDraft {
    name:        ListName,
    list_type:   ListType,
    optin:       ListOptin,
    tags:        Vec<String>,
    description: String,
}

impl ListDraft {
    /// 検証済みの値から作成する
    ///
    /// タグは前後の空白を除去し、空になったものは捨てる。
    pub fn new(
        name: ListName,
        list_type: ListType,
        optin: ListOptin,
        tags: Vec<String>,
        description: String,
    ) -> Self {
        let tags = tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        Self {
            name,
            list_type,
            optin,
            tags,
            description,
        }
    }

    pub fn name(&self) -> &ListName {
        &self.name
    }

    pub fn list_type(&self) -> ListType {
        self.list_type
    }

    pub fn optin(&self) -> ListOptin {
        self.optin
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

// =========================================================================
// List
// =========================================================================

/// リストエンティティ
///
/// レスポンスとして返される形。購読状態ごとの件数は保持せず、
/// 合計値 [`subscriber_count`](List::subscriber_count) のみを持つ。
#[derive(Clone, PartialEq, Eq)]
pub struct List {
    id: ListId,
    uuid: Uuid,
    name: String,
    list_type: ListType,
    optin: ListOptin,
    tags: Vec<String>,
    description: String,
    subscriber_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl List {
    /// 永続化済みのデータから復元する
    #[allow(clippy::too_many_arguments)]
    pub fn from_db(
        id: ListId,
        uuid: Uuid,
        name: String,
        list_type: ListType,
        optin: ListOptin,
        tags: Vec<String>,
        description: String,
        subscriber_count: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            uuid,
            name,
            list_type,
            optin,
            tags,
            description,
            subscriber_count,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> ListId {
        self.id
    }

    pub fn uuid(&self) -> &Uuid {
        &self.uuid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn list_type(&self) -> ListType {
        self.list_type
    }

    pub fn optin(&self) -> ListOptin {
        self.optin
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn subscriber_count(&self) -> i64 {
        self.subscriber_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl fmt::Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("List")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("list_type", &self.list_type)
            .field("tags", &self.tags)
            .field("subscriber_count", &self.subscriber_count)
            .finish_non_exhaustive()
    }
}
