//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! - 各ハンドラはサブモジュールに配置し、ここで re-export する
//! - ハンドラは薄く保ち、検証と集計はユースケースに委譲

pub mod health;
pub mod list;

pub use health::{ReadinessState, health_check, readiness_check};
pub use list::{ListState, create_list, delete_list, get_list, get_lists, update_list};
