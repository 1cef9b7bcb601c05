//! # ページネーション付きレスポンス
//!
//! ページ番号ベースの一覧レスポンス型。

use serde::{Deserialize, Serialize};

/// ページネーション付きレスポンス
///
/// `ApiResponse<T>` の `data` に入れて返す一覧用の入れ物。
///
/// ## JSON 形式
///
/// ```json
/// {
///   "results": [...],
///   "total": 42,
///   "per_page": 20,
///   "page": 1
/// }
/// ```
///
/// `total` は条件に一致した全件数であり、`results` の件数ではない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub results:  Vec<T>,
    pub total:    i64,
    pub per_page: i64,
    pub page:     i64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(results: Vec<T>, total: i64, per_page: i64, page: i64) -> Self {
        Self {
            results,
            total,
            per_page,
            page,
        }
    }

    /// 要素の型を変換する
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResponse<U> {
        PaginatedResponse {
            results:  self.results.into_iter().map(f).collect(),
            total:    self.total,
            per_page: self.per_page,
            page:     self.page,
        }
    }
}
