//! # Clock（時刻プロバイダ）
//!
//! `Utc::now()` 直接呼び出しを置き換え、テストで固定時刻を注入可能にするための抽象化。
//! リストのタイムスタンプは Store が採番するため、主にインメモリ Store から使用する。

use chrono::{DateTime, Utc};

/// 現在時刻を提供するトレイト
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// 固定時刻を返すテスト用実装
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}
