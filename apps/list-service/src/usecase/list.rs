//! # リスト管理ユースケース
//!
//! リストの取得（単一・集計付き一覧・最小一覧）と作成・更新・削除を行う。
//!
//! ## 一覧のメタ情報
//!
//! | 経路 | `page` | `per_page` | `total` |
//! |------|--------|------------|---------|
//! | 集計付き一覧 | 要求値 | 要求値（制限なしなら `total`） | Store の総件数 |
//! | 最小一覧 | 1 | 件数 | 件数 |
//!
//! 購読者数は Store が返す状態別件数の合計。タグが NULL の場合は空配列にする。

use std::sync::Arc;

use mailflow_domain::list::{
    List,
    ListDraft,
    ListId,
    ListName,
    ListOptin,
    ListOrderBy,
    ListType,
    SortOrder,
};
use mailflow_infra::repository::{ListQuery, ListRepository, StoredList};
use mailflow_shared::{Localizer, PaginatedResponse, Pagination};

use crate::error::CoreError;

/// 集計付き一覧の入力
///
/// クエリパラメータの生の値を受け取り、並び替え条件の検証はユースケースで行う。
#[derive(Debug, Clone, Default)]
pub struct QueryListsInput {
    /// 名前の検索語（前後の空白は除去する）
    pub search:     String,
    pub order_by:   Option<String>,
    pub order:      Option<String>,
    pub pagination: Pagination,
}

/// 作成・更新の入力
#[derive(Debug, Clone, Default)]
pub struct ListInput {
    pub name:        String,
    pub list_type:   Option<String>,
    pub optin:       Option<String>,
    pub tags:        Vec<String>,
    pub description: Option<String>,
}

/// リスト管理ユースケース
pub struct ListUseCaseImpl {
    list_repository: Arc<dyn ListRepository>,
    localizer:       Arc<dyn Localizer>,
}

impl ListUseCaseImpl {
    pub fn new(list_repository: Arc<dyn ListRepository>, localizer: Arc<dyn Localizer>) -> Self {
        Self {
            list_repository,
            localizer,
        }
    }

    /// パスパラメータからリスト ID を解析する
    ///
    /// 正の整数でない場合は「不正な ID」の検証エラー。
    pub fn parse_id(&self, raw: &str) -> Result<ListId, CoreError> {
        ListId::parse(raw).ok_or_else(|| self.invalid_id())
    }

    /// ID 指定で 1 件取得する
    #[tracing::instrument(skip_all, fields(%id))]
    pub async fn get_list(&self, id: ListId) -> Result<List, CoreError> {
        let result = self
            .list_repository
            .query_lists(&ListQuery::by_id(id))
            .await?;

        result
            .lists
            .into_iter()
            .next()
            .map(to_list)
            .ok_or_else(|| self.list_not_found())
    }

    /// 全リストを集計なしで取得する
    ///
    /// ページングは行わず、メタ情報は `page = 1`, `per_page = total = 件数`。
    pub async fn list_minimal(&self) -> Result<PaginatedResponse<List>, CoreError> {
        let lists: Vec<List> = self
            .list_repository
            .find_all()
            .await?
            .into_iter()
            .map(to_list)
            .collect();

        let total = lists.len() as i64;
        Ok(PaginatedResponse::new(lists, total, total, 1))
    }

    /// 検索・並び替え・ページング付きで集計済みの一覧を取得する
    #[tracing::instrument(skip_all, fields(page = input.pagination.page()))]
    pub async fn query_lists(
        &self,
        input: QueryListsInput,
    ) -> Result<PaginatedResponse<List>, CoreError> {
        let order_by = parse_or_default::<ListOrderBy>(input.order_by.as_deref())
            .map_err(|_| self.invalid_field("order_by"))?;
        let order = parse_or_default::<SortOrder>(input.order.as_deref())
            .map_err(|_| self.invalid_field("order"))?;

        let pagination = input.pagination;
        let result = self
            .list_repository
            .query_lists(&ListQuery {
                id: None,
                search: input.search.trim().to_string(),
                order_by,
                order,
                offset: pagination.offset(),
                limit: pagination.limit(),
            })
            .await?;

        let per_page = match pagination.per_page() {
            0 => result.total,
            n => n,
        };

        Ok(PaginatedResponse::new(
            result.lists.into_iter().map(to_list).collect(),
            result.total,
            per_page,
            pagination.page(),
        ))
    }

    /// リストを作成する
    #[tracing::instrument(skip_all)]
    pub async fn create_list(&self, input: ListInput) -> Result<List, CoreError> {
        let draft = self.validate(input)?;
        let stored = self.list_repository.insert(&draft).await?;

        tracing::info!(id = %stored.id, "リストを作成しました");
        Ok(to_list(stored))
    }

    /// リストを更新する
    ///
    /// 対象が存在しない場合はローカライズされた NotFound。
    #[tracing::instrument(skip_all, fields(%id))]
    pub async fn update_list(&self, id: ListId, input: ListInput) -> Result<List, CoreError> {
        let draft = self.validate(input)?;

        let stored = self
            .list_repository
            .update(id, &draft)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    self.list_not_found()
                } else {
                    CoreError::Database(e)
                }
            })?;

        Ok(to_list(stored))
    }

    /// リストをまとめて削除する
    ///
    /// 有効な ID が 1 つもなければ Store を呼ばずに検証エラー。
    #[tracing::instrument(skip_all, fields(count = ids.len()))]
    pub async fn delete_lists(&self, ids: &[ListId]) -> Result<(), CoreError> {
        if ids.is_empty() {
            return Err(self.invalid_id());
        }

        let deleted = self.list_repository.delete_by_ids(ids).await?;
        tracing::info!(deleted, "リストを削除しました");
        Ok(())
    }

    /// 作成・更新の入力を検証し、Store に渡す形にする
    fn validate(&self, input: ListInput) -> Result<ListDraft, CoreError> {
        let name = ListName::new(input.name)
            .map_err(|_| CoreError::Validation(self.localizer.t("lists.invalid_name")))?;

        let list_type = parse_or_default::<ListType>(input.list_type.as_deref())
            .map_err(|_| CoreError::Validation(self.localizer.t("lists.invalid_type")))?;

        let optin = parse_or_default::<ListOptin>(input.optin.as_deref())
            .map_err(|_| CoreError::Validation(self.localizer.t("lists.invalid_optin")))?;

        Ok(ListDraft::new(
            name,
            list_type,
            optin,
            input.tags,
            input.description.unwrap_or_default(),
        ))
    }

    fn invalid_id(&self) -> CoreError {
        CoreError::Validation(self.localizer.t("errors.invalid_id"))
    }

    fn invalid_field(&self, field: &str) -> CoreError {
        CoreError::Validation(
            self.localizer
                .ts("errors.invalid_fields", &[("name", field)]),
        )
    }

    fn list_not_found(&self) -> CoreError {
        CoreError::NotFound(
            self.localizer
                .ts("errors.not_found", &[("name", "{terms.list}")]),
        )
    }
}

/// 列挙値の入力を解析する。未指定・空文字列はデフォルト
fn parse_or_default<T>(raw: Option<&str>) -> Result<T, T::Err>
where
    T: std::str::FromStr + Default,
{
    match raw.map(str::trim) {
        None | Some("") => Ok(T::default()),
        Some(value) => value.parse(),
    }
}

/// Store のレコードをレスポンス用のエンティティに変換する
fn to_list(stored: StoredList) -> List {
    let subscriber_count = stored.subscriber_counts.values().sum();

    List::from_db(
        stored.id,
        stored.uuid,
        stored.name,
        stored.list_type,
        stored.optin,
        stored.tags.unwrap_or_default(),
        stored.description,
        subscriber_count,
        stored.created_at,
        stored.updated_at,
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use mailflow_domain::list::SubscriptionStatus;
    use mailflow_infra::fake::FakeListRepository;
    use mailflow_shared::{Catalog, Lang};
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;

    struct Sut {
        repo:    FakeListRepository,
        usecase: ListUseCaseImpl,
    }

    #[fixture]
    fn sut() -> Sut {
        let repo = FakeListRepository::new();
        let localizer = Arc::new(Catalog::new(Lang::En).unwrap());
        let usecase = ListUseCaseImpl::new(Arc::new(repo.clone()), localizer);
        Sut { repo, usecase }
    }

    fn input(name: &str) -> ListInput {
        ListInput {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn unwrap_validation(err: CoreError) -> String {
        match err {
            CoreError::Validation(msg) => msg,
            other => panic!("検証エラーであること: {other:?}"),
        }
    }

    // ===== get_list =====

    #[rstest]
    #[tokio::test]
    async fn test_購読者数は状態別件数の合計になる(sut: Sut) {
        let id = sut.repo.add_list_with(
            "Newsletter",
            None,
            HashMap::from([
                (SubscriptionStatus::Unconfirmed, 2),
                (SubscriptionStatus::Confirmed, 5),
                (SubscriptionStatus::Unsubscribed, 1),
            ]),
        );

        let list = sut.usecase.get_list(id).await.unwrap();

        assert_eq!(list.subscriber_count(), 8);
        assert_eq!(list.tags(), &[] as &[String]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_存在しないidはローカライズされたnot_found(sut: Sut) {
        let err = sut
            .usecase
            .get_list(ListId::new(42).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::NotFound(ref msg) if msg == "List not found."));
    }

    // ===== list_minimal =====

    #[rstest]
    #[tokio::test]
    async fn test_最小一覧のメタ情報は件数から合成される(sut: Sut) {
        sut.repo.add_list("a");
        sut.repo.add_list_with("b", None, HashMap::new());
        sut.repo.add_list("c");

        let page = sut.usecase.list_minimal().await.unwrap();

        assert_eq!(page.results.len(), 3);
        assert_eq!(page.total, 3);
        assert_eq!(page.per_page, 3);
        assert_eq!(page.page, 1);
        assert!(page.results.iter().all(|l| l.subscriber_count() == 0));
        assert_eq!(page.results[1].tags(), &[] as &[String]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_リストが無ければ最小一覧は空(sut: Sut) {
        let page = sut.usecase.list_minimal().await.unwrap();
        assert!(page.results.is_empty());
        assert_eq!(page.total, 0);
    }

    // ===== query_lists =====

    #[rstest]
    #[tokio::test]
    async fn test_ページングの総件数は一致件数全体(sut: Sut) {
        for i in 0..25 {
            sut.repo.add_list(&format!("list-{i:02}"));
        }

        let page = sut
            .usecase
            .query_lists(QueryListsInput {
                order_by: Some("name".to_string()),
                order: Some("asc".to_string()),
                pagination: Pagination::from_params(Some("2"), Some("10"), 20),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total, 25);
        assert_eq!(page.per_page, 10);
        assert_eq!(page.page, 2);
        assert_eq!(page.results.len(), 10);
        assert_eq!(page.results[0].name(), "list-10");
    }

    #[rstest]
    #[tokio::test]
    async fn test_件数制限なしではper_pageが総件数になる(sut: Sut) {
        for i in 0..4 {
            sut.repo.add_list(&format!("list-{i}"));
        }

        let page = sut
            .usecase
            .query_lists(QueryListsInput {
                pagination: Pagination::from_params(None, Some("all"), 20),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total, 4);
        assert_eq!(page.per_page, 4);
        assert_eq!(page.results.len(), 4);
    }

    #[rstest]
    #[tokio::test]
    async fn test_検索語は前後の空白を除いて部分一致する(sut: Sut) {
        sut.repo.add_list("Weekly News");
        sut.repo.add_list("Offers");

        let page = sut
            .usecase
            .query_lists(QueryListsInput {
                search: "  news ".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.results[0].name(), "Weekly News");
    }

    #[rstest]
    #[case(Some("id"), None, "Invalid fields: order_by")]
    #[case(Some("name; DROP TABLE lists"), None, "Invalid fields: order_by")]
    #[case(None, Some("sideways"), "Invalid fields: order")]
    #[tokio::test]
    async fn test_許可されていない並び替え条件は検証エラー(
        sut: Sut,
        #[case] order_by: Option<&str>,
        #[case] order: Option<&str>,
        #[case] expected: &str,
    ) {
        sut.repo.set_unavailable(true);

        let err = sut
            .usecase
            .query_lists(QueryListsInput {
                order_by: order_by.map(str::to_string),
                order: order.map(str::to_string),
                ..Default::default()
            })
            .await
            .unwrap_err();

        // Store を呼ぶ前に弾かれるので Database エラーにならない
        assert_eq!(unwrap_validation(err), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn test_空の並び替え条件はデフォルトになる(sut: Sut) {
        sut.repo.add_list("a");

        let page = sut
            .usecase
            .query_lists(QueryListsInput {
                order_by: Some(String::new()),
                order: Some(" ".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_store障害はdatabaseエラー(sut: Sut) {
        sut.repo.set_unavailable(true);

        let err = sut
            .usecase
            .query_lists(QueryListsInput::default())
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::Database(_)));
    }

    // ===== create_list =====

    #[rstest]
    #[tokio::test]
    async fn test_作成したリストは購読者数0で返る(sut: Sut) {
        let list = sut
            .usecase
            .create_list(ListInput {
                name: "  Weekly  ".to_string(),
                list_type: Some("public".to_string()),
                optin: Some("double".to_string()),
                tags: vec!["news".to_string(), " ".to_string()],
                description: None,
            })
            .await
            .unwrap();

        assert_eq!(list.name(), "Weekly");
        assert_eq!(list.list_type(), ListType::Public);
        assert_eq!(list.optin(), ListOptin::Double);
        assert_eq!(list.tags(), &["news".to_string()]);
        assert_eq!(list.description(), "");
        assert_eq!(list.subscriber_count(), 0);
        assert_eq!(sut.repo.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_区分とオプトイン未指定はデフォルト(sut: Sut) {
        let list = sut.usecase.create_list(input("x")).await.unwrap();

        assert_eq!(list.list_type(), ListType::Private);
        assert_eq!(list.optin(), ListOptin::Single);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[tokio::test]
    async fn test_空の名前は作成前に拒否する(sut: Sut, #[case] name: &str) {
        let err = sut.usecase.create_list(input(name)).await.unwrap_err();

        assert_eq!(unwrap_validation(err), "Invalid name.");
        assert!(sut.repo.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_長すぎる名前は拒否する(sut: Sut) {
        let err = sut
            .usecase
            .create_list(input(&"a".repeat(201)))
            .await
            .unwrap_err();

        assert_eq!(unwrap_validation(err), "Invalid name.");
    }

    #[rstest]
    #[tokio::test]
    async fn test_上限ちょうどの名前は受け入れる(sut: Sut) {
        assert!(sut.usecase.create_list(input(&"a".repeat(200))).await.is_ok());
    }

    #[rstest]
    #[case(Some("secret"), None, "Invalid list type.")]
    #[case(None, Some("triple"), "Invalid opt-in type.")]
    #[tokio::test]
    async fn test_不正な区分とオプトインは拒否する(
        sut: Sut,
        #[case] list_type: Option<&str>,
        #[case] optin: Option<&str>,
        #[case] expected: &str,
    ) {
        let err = sut
            .usecase
            .create_list(ListInput {
                name: "x".to_string(),
                list_type: list_type.map(str::to_string),
                optin: optin.map(str::to_string),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert_eq!(unwrap_validation(err), expected);
    }

    // ===== update_list =====

    #[rstest]
    #[tokio::test]
    async fn test_更新後のリストは集計済みの購読者数を持つ(sut: Sut) {
        let id = sut.repo.add_list_with(
            "old",
            Some(vec!["a".to_string()]),
            HashMap::from([(SubscriptionStatus::Confirmed, 3)]),
        );

        let list = sut.usecase.update_list(id, input("new")).await.unwrap();

        assert_eq!(list.name(), "new");
        assert_eq!(list.subscriber_count(), 3);
        assert_eq!(sut.repo.get(id).unwrap().name, "new");
    }

    #[rstest]
    #[tokio::test]
    async fn test_存在しないリストの更新はnot_found(sut: Sut) {
        let err = sut
            .usecase
            .update_list(ListId::new(7).unwrap(), input("x"))
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::NotFound(ref msg) if msg == "List not found."));
    }

    #[rstest]
    #[case("0")]
    #[case("-1")]
    #[case("abc")]
    fn test_正の整数でないidは不正なid(sut: Sut, #[case] raw: &str) {
        let err = sut.usecase.parse_id(raw).unwrap_err();
        assert_eq!(unwrap_validation(err), "Invalid ID.");
    }

    // ===== delete_lists =====

    #[rstest]
    #[tokio::test]
    async fn test_指定したリストを削除する(sut: Sut) {
        let a = sut.repo.add_list("a");
        let b = sut.repo.add_list("b");

        sut.usecase.delete_lists(&[a]).await.unwrap();

        assert!(sut.repo.get(a).is_none());
        assert!(sut.repo.get(b).is_some());
    }

    #[rstest]
    #[tokio::test]
    async fn test_idが無ければstoreを呼ばずに拒否する(sut: Sut) {
        sut.repo.set_unavailable(true);

        let err = sut.usecase.delete_lists(&[]).await.unwrap_err();

        assert_eq!(unwrap_validation(err), "Invalid ID.");
    }

    // ===== ローカライズ =====

    #[tokio::test]
    async fn test_日本語カタログではメッセージが日本語になる() {
        let repo = FakeListRepository::new();
        let localizer = Arc::new(Catalog::new(Lang::Ja).unwrap());
        let usecase = ListUseCaseImpl::new(Arc::new(repo), localizer);

        let err = usecase
            .get_list(ListId::new(1).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::NotFound(ref msg) if msg == "リストが見つかりません。"));
    }
}
