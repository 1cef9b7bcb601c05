//! # List Service サーバー
//!
//! メーリングリスト（購読者セグメント）の管理 API を提供する。
//!
//! ## 役割
//!
//! - **取得**: 単一・集計付き一覧・集計なしの最小一覧
//! - **変更**: 作成・更新・削除
//! - **集計**: リクエスト時に購読状態別の件数から購読者数を算出
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `LIST_SERVICE_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `LIST_SERVICE_PORT` | **Yes** | ポート番号 |
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//! | `APP_LANG` | No | エラーメッセージの言語（`en` / `ja`） |
//! | `LIST_DEFAULT_PER_PAGE` | No | 一覧のデフォルト件数 |
//! | `LOG_FORMAT` | No | `json` / `pretty` |
//! | `RUST_LOG` | No | ログレベル（デフォルト: `info,mailflow=debug`） |
//!
//! ## 起動方法
//!
//! ```bash
//! LIST_SERVICE_PORT=3100 DATABASE_URL=postgres://... cargo run -p mailflow-list-service
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use mailflow_infra::{
    db,
    repository::{ListRepository, PostgresListRepository},
};
use mailflow_list_service::{
    app_builder::build_app,
    config::ListServiceConfig,
    handler::{ListState, ReadinessState},
    usecase::ListUseCaseImpl,
};
use mailflow_shared::{
    Catalog,
    Localizer,
    observability::{TracingConfig, init_tracing},
};
use tokio::net::TcpListener;

/// List Service サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    // トレーシング初期化
    init_tracing(TracingConfig::from_env("list-service"));
    let _tracing_guard = tracing::info_span!("app", service = "list-service").entered();

    // 設定読み込み
    let config = ListServiceConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        "List Service サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    // データベース接続プールを作成
    let pool = db::create_pool(&config.database_url)
        .await
        .context("データベース接続に失敗しました")?;
    tracing::info!("データベースに接続しました");

    // 依存コンポーネントを初期化
    let list_repository: Arc<dyn ListRepository> = Arc::new(PostgresListRepository::new(pool));
    let localizer: Arc<dyn Localizer> =
        Arc::new(Catalog::new(config.lang).context("メッセージカタログの読み込みに失敗しました")?);

    let readiness_state = Arc::new(ReadinessState {
        list_repository: list_repository.clone(),
    });
    let list_state = Arc::new(ListState {
        usecase:          ListUseCaseImpl::new(list_repository, localizer),
        default_per_page: config.default_per_page,
    });

    let app = build_app(list_state, readiness_state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("アドレスのパースに失敗しました")?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("List Service サーバーが起動しました: {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
