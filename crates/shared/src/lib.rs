//! # Mailflow 共有ユーティリティ
//!
//! サービス全体で使用される共通ユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - domain / infra / list-service のいずれからも依存できる
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - axum への依存は持たない（`IntoResponse` 変換は各サービスの責務）

pub mod api_response;
pub mod error_response;
pub mod health;
pub mod i18n;
pub mod observability;
pub mod paginated_response;
pub mod pagination;

pub use api_response::ApiResponse;
pub use error_response::ErrorResponse;
pub use health::{CheckStatus, HealthResponse, ReadinessResponse, ReadinessStatus};
pub use i18n::{Catalog, Lang, Localizer};
pub use paginated_response::PaginatedResponse;
pub use pagination::Pagination;
