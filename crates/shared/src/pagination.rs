//! # ページネーションパラメータ
//!
//! クエリパラメータ `page` / `per_page` をオフセット・リミットに変換する。
//!
//! ## 変換ルール
//!
//! | 入力 | 結果 |
//! |------|------|
//! | `page` 未指定・数値以外・1 未満 | 1 ページ目 |
//! | `per_page` 未指定・数値以外・1 未満 | デフォルト件数 |
//! | `per_page=all` | 件数制限なし（`per_page == 0`） |
//!
//! 不正な値はエラーにせず、デフォルトに丸める。

/// `per_page` で件数制限なしを表す値
pub const PER_PAGE_ALL: &str = "all";

/// 1 ページあたりのデフォルト件数
pub const DEFAULT_PER_PAGE: i64 = 20;

/// オフセット・リミット形式のページ指定
///
/// `per_page == 0` は件数制限なしを意味し、その場合 `limit()` は `None` を返す。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page:     i64,
    per_page: i64,
}

impl Pagination {
    /// クエリパラメータの生文字列から作成する
    pub fn from_params(page: Option<&str>, per_page: Option<&str>, default_per_page: i64) -> Self {
        let page = page
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);

        let per_page = match per_page.map(str::trim) {
            Some(PER_PAGE_ALL) => 0,
            Some(pp) => pp
                .parse::<i64>()
                .ok()
                .filter(|pp| *pp >= 1)
                .unwrap_or(default_per_page),
            None => default_per_page,
        };

        Self { page, per_page }
    }

    /// 1 始まりのページ番号
    pub fn page(&self) -> i64 {
        self.page
    }

    /// 1 ページあたりの件数（0 は制限なし）
    pub fn per_page(&self) -> i64 {
        self.per_page
    }

    /// 読み飛ばす件数
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// 取得件数の上限（制限なしの場合は `None`）
    pub fn limit(&self) -> Option<i64> {
        (self.per_page > 0).then_some(self.per_page)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page:     1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}
