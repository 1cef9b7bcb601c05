//! # テスト用インメモリ Store
//!
//! ユースケース・ハンドラのテストで使用するインメモリの [`ListRepository`] 実装。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! mailflow-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::{
    cmp::Ordering,
    collections::HashMap,
    sync::{
        Arc,
        Mutex,
        atomic::{AtomicBool, AtomicI64, Ordering as AtomicOrdering},
    },
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mailflow_domain::{
    clock::{Clock, FixedClock},
    list::{ListDraft, ListId, ListOptin, ListOrderBy, ListType, SortOrder, SubscriptionStatus},
};
use uuid::Uuid;

use crate::{
    error::InfraError,
    repository::{ListQuery, ListQueryResult, ListRepository, StoredList},
};

/// テストで使う固定時刻（2026-01-01T00:00:00Z）
fn default_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_767_225_600, 0).unwrap_or_default()
}

/// インメモリの ListRepository
///
/// `set_unavailable(true)` にすると全操作が失敗し、Store 障害を再現できる。
#[derive(Clone)]
pub struct FakeListRepository {
    lists:       Arc<Mutex<Vec<StoredList>>>,
    next_id:     Arc<AtomicI64>,
    unavailable: Arc<AtomicBool>,
    clock:       Arc<dyn Clock>,
}

impl Default for FakeListRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeListRepository {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(FixedClock::new(default_now())))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            lists: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicI64::new(1)),
            unavailable: Arc::new(AtomicBool::new(false)),
            clock,
        }
    }

    /// 名前だけを指定してリストを登録し、採番された ID を返す
    pub fn add_list(&self, name: &str) -> ListId {
        self.add_list_with(name, Some(Vec::new()), HashMap::new())
    }

    /// タグと購読状態ごとの件数を指定してリストを登録する
    pub fn add_list_with(
        &self,
        name: &str,
        tags: Option<Vec<String>>,
        subscriber_counts: HashMap<SubscriptionStatus, i64>,
    ) -> ListId {
        let id = self.allocate_id();
        let now = self.clock.now();
        self.lists.lock().unwrap().push(StoredList {
            id,
            uuid: Uuid::new_v4(),
            name: name.to_string(),
            list_type: ListType::default(),
            optin: ListOptin::default(),
            tags,
            description: String::new(),
            subscriber_counts,
            created_at: now,
            updated_at: now,
        });
        id
    }

    /// 登録済みのリストを取得する
    pub fn get(&self, id: ListId) -> Option<StoredList> {
        self.lists.lock().unwrap().iter().find(|l| l.id == id).cloned()
    }

    /// 登録件数
    pub fn len(&self) -> usize {
        self.lists.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store 障害を再現する
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, AtomicOrdering::SeqCst);
    }

    fn allocate_id(&self) -> ListId {
        let id = self.next_id.fetch_add(1, AtomicOrdering::SeqCst);
        ListId::new(id).unwrap()
    }

    fn check_available(&self) -> Result<(), InfraError> {
        if self.unavailable.load(AtomicOrdering::SeqCst) {
            return Err(InfraError::unexpected("Store に接続できません"));
        }
        Ok(())
    }
}

fn subscriber_total(list: &StoredList) -> i64 {
    list.subscriber_counts.values().sum()
}

fn compare(a: &StoredList, b: &StoredList, order_by: ListOrderBy) -> Ordering {
    match order_by {
        ListOrderBy::Name => a.name.cmp(&b.name),
        ListOrderBy::Type => a.list_type.cmp(&b.list_type),
        ListOrderBy::SubscriberCount => subscriber_total(a).cmp(&subscriber_total(b)),
        ListOrderBy::CreatedAt => a.created_at.cmp(&b.created_at),
        ListOrderBy::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}

#[async_trait]
impl ListRepository for FakeListRepository {
    async fn query_lists(&self, query: &ListQuery) -> Result<ListQueryResult, InfraError> {
        self.check_available()?;

        let needle = query.search.to_lowercase();
        let mut matched: Vec<StoredList> = self
            .lists
            .lock()
            .unwrap()
            .iter()
            .filter(|l| query.id.is_none_or(|id| l.id == id))
            .filter(|l| needle.is_empty() || l.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();

        matched.sort_by(|a, b| {
            let ord = compare(a, b, query.order_by);
            let ord = match query.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            };
            ord.then(a.id.cmp(&b.id))
        });

        let total = matched.len() as i64;
        let offset = usize::try_from(query.offset).unwrap_or(0);
        let lists = matched
            .into_iter()
            .skip(offset)
            .take(query.limit.map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(0)))
            .collect::<Vec<_>>();

        // 範囲外のページは PostgreSQL 実装と同じく行なし・総件数 0 になる
        let total = if lists.is_empty() { 0 } else { total };

        Ok(ListQueryResult { lists, total })
    }

    async fn find_all(&self) -> Result<Vec<StoredList>, InfraError> {
        self.check_available()?;

        let mut lists: Vec<StoredList> = self
            .lists
            .lock()
            .unwrap()
            .iter()
            .cloned()
            .map(|mut l| {
                l.subscriber_counts.clear();
                l
            })
            .collect();
        lists.sort_by_key(|l| l.id);
        Ok(lists)
    }

    async fn insert(&self, draft: &ListDraft) -> Result<StoredList, InfraError> {
        self.check_available()?;

        let now = self.clock.now();
        let list = StoredList {
            id:                self.allocate_id(),
            uuid:              Uuid::new_v4(),
            name:              draft.name().as_str().to_string(),
            list_type:         draft.list_type(),
            optin:             draft.optin(),
            tags:              Some(draft.tags().to_vec()),
            description:       draft.description().to_string(),
            subscriber_counts: HashMap::new(),
            created_at:        now,
            updated_at:        now,
        };
        self.lists.lock().unwrap().push(list.clone());
        Ok(list)
    }

    async fn update(&self, id: ListId, draft: &ListDraft) -> Result<StoredList, InfraError> {
        self.check_available()?;

        let mut lists = self.lists.lock().unwrap();
        let list = lists
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| InfraError::not_found("List", id.to_string()))?;

        list.name = draft.name().as_str().to_string();
        list.list_type = draft.list_type();
        list.optin = draft.optin();
        list.tags = Some(draft.tags().to_vec());
        list.description = draft.description().to_string();
        list.updated_at = self.clock.now();
        Ok(list.clone())
    }

    async fn delete_by_ids(&self, ids: &[ListId]) -> Result<u64, InfraError> {
        self.check_available()?;

        let mut lists = self.lists.lock().unwrap();
        let before = lists.len();
        lists.retain(|l| !ids.contains(&l.id));
        Ok((before - lists.len()) as u64)
    }

    async fn ping(&self) -> Result<(), InfraError> {
        self.check_available()
    }
}
