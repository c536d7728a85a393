use std::net::SocketAddr;
use std::sync::Arc;

use formpilot_server::{
    config::{establish_connection, AppConfig, DataSourceKind},
    create_app,
    domain::{
        ai::{AiClient, OpenAiClient},
        health::init_start_time,
    },
    global::shutdown_signal,
    state::AppState,
    storage::LocalBlobStore,
    store::{DataSource, FixtureDataSource, SeaOrmDataSource},
    utils::logging::init_logging,
};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // 1. 환경변수 로드
    dotenvy::dotenv().ok();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // 2. 로깅 초기화 (guard는 main이 끝날 때까지 유지)
    let _log_guard = init_logging(&config);
    init_start_time();

    // 3. 데이터 소스 선택
    let store: Arc<dyn DataSource> = match config.data_source {
        DataSourceKind::Database => {
            let Some(url) = config.database_url.as_deref() else {
                error!("DATABASE_URL is missing");
                std::process::exit(1);
            };
            match establish_connection(url, config.db_schema_update).await {
                Ok(db) => Arc::new(SeaOrmDataSource::new(db)),
                Err(e) => {
                    error!(error = %e, "Failed to connect to the database");
                    std::process::exit(1);
                }
            }
        }
        DataSourceKind::Fixture => {
            info!("Using in-memory fixture data source");
            Arc::new(FixtureDataSource::seeded())
        }
    };

    let ai = config.openai_api_key.as_deref().map(|key| -> AiClient {
        Arc::new(OpenAiClient::new(
            key,
            config.submission_model.clone(),
            config.chat_model.clone(),
        ))
    });

    let blobs = Arc::new(LocalBlobStore::new(
        config.upload_dir.clone(),
        config.app_base_url.clone(),
    ));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let state = AppState {
        store,
        ai,
        blobs,
        config,
    };

    // 4. 라우터 설정
    let app = create_app(state);

    // 5. 서버 실행
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, addr = %addr, "Failed to bind address");
            std::process::exit(1);
        }
    };
    info!("Server listening on {}", addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "Server error");
    }
    info!("Server shut down");
}
