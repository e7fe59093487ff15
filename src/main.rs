//! # Article Shelf 웹 서버 진입점
//!
//! 이 파일은 애플리케이션의 **시작점(entry point)**입니다.
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. SQLite 데이터베이스 연결 풀 생성과 마이그레이션
//! 4. 시드 사용자 등록 (설정된 경우)
//! 5. 외부 협력자(견출 추출, 요약 생성) 연결
//! 6. HTTP 서버 시작

use anyhow::Result;
use article_shelf::config::{CollaboratorMode, Config, ConfigError};
use article_shelf::services::{
    drafts::DraftRegistry,
    headings::{CannedHeadingExtractor, HeadingExtractor, HttpHeadingExtractor},
    summary::{CannedSummaryGenerator, RemoteSummaryGenerator, SummaryGenerator},
};
use article_shelf::{db, routes, AppState};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::{str::FromStr, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅(tracing) 초기화 ──
    // RUST_LOG가 없으면 article_shelf, tower_http, axum 모듈을 debug 레벨로 설정
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "article_shelf=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── 3단계: 설정 로딩 ──
    let config = Config::from_env()?;
    tracing::info!(
        "Starting Article Shelf server on {}:{} ({:?} collaborators)",
        config.host,
        config.port,
        config.collaborator_mode
    );

    // ── 4단계: SQLite 연결 풀 생성 ──
    // create_if_missing: DB 파일이 없으면 새로 만듭니다.
    // foreign_keys: article_tags의 ON DELETE CASCADE가 동작하려면 필요합니다.
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // ── 5단계: 데이터베이스 마이그레이션 실행 ──
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    // ── 6단계: 시드 사용자 ──
    if let Some(seed) = &config.seed_user {
        let user =
            db::users::seed_active_user(&pool, &seed.provider, &seed.provider_account_id).await?;
        tracing::info!(user_id = %user.id, provider = %user.provider, "seed user is active");
    }

    // ── 7단계: 외부 협력자 연결 ──
    // canned: 고정 지연 후 고정 응답, live: reqwest로 실제 호출
    let (extractor, summarizer): (Arc<dyn HeadingExtractor>, Arc<dyn SummaryGenerator>) =
        match config.collaborator_mode {
            CollaboratorMode::Canned => (
                Arc::new(CannedHeadingExtractor::new(config.canned_latency)),
                Arc::new(CannedSummaryGenerator::new(config.canned_latency)),
            ),
            CollaboratorMode::Live => {
                let client = reqwest::Client::builder()
                    .timeout(config.external_timeout)
                    .user_agent(concat!("article-shelf/", env!("CARGO_PKG_VERSION")))
                    .build()?;
                let endpoint = config
                    .summary_service_url
                    .clone()
                    .ok_or(ConfigError::Missing("SUMMARY_SERVICE_URL"))?;
                (
                    Arc::new(HttpHeadingExtractor::new(client.clone())?),
                    Arc::new(RemoteSummaryGenerator::new(client, endpoint)),
                )
            }
        };

    // ── 8단계: 애플리케이션 상태(State) 생성 ──
    let drafts = Arc::new(DraftRegistry::new(config.draft_ttl));
    let state = AppState {
        pool: pool.clone(),
        jwt_secret: config.jwt_secret.clone(),
        identity_secret: config.identity_secret.clone(),
        session_max_age: config.session_max_age,
        extractor,
        summarizer,
        drafts: drafts.clone(),
        external_timeout: config.external_timeout,
    };

    // 방치된 드래프트를 주기적으로 정리합니다. (새 드래프트 생성 시에도 정리됩니다)
    let sweep_every = config.draft_ttl.max(std::time::Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_every);
        loop {
            interval.tick().await;
            drafts.purge_stale();
        }
    });

    // ── 9단계: 서버 시작 ──
    let app = routes::app(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
