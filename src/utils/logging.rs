//! 로깅 초기화 모듈
//!
//! stdout과 일별 로그 파일에 JSON 로그를 함께 남깁니다.

use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::AppConfig;

/// 기본 로그 필터
pub const DEFAULT_LOG_FILTER: &str = "info,formpilot_server=debug,tower_http=info";

/// 로그 파일 접두사 (`formpilot.log.YYYY-MM-DD`)
pub const LOG_FILE_PREFIX: &str = "formpilot.log";

/// 설정의 필터 지시어를 해석합니다. 잘못된 지시어는 기본 필터로 대체합니다.
pub fn log_filter(config: &AppConfig) -> EnvFilter {
    config
        .log_filter
        .as_deref()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// 로깅 시스템을 초기화하고 실행 구성을 한 줄로 기록합니다.
///
/// 반환되는 `WorkerGuard`는 main이 끝날 때까지 유지해야 버퍼링된 파일 로그가 남습니다.
pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    let (file_writer, guard) =
        tracing_appender::non_blocking(rolling::daily(&config.log_dir, LOG_FILE_PREFIX));

    let stdout_layer = fmt::layer()
        .json()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_current_span(true)
        .flatten_event(false);

    let file_layer = fmt::layer()
        .json()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_current_span(true)
        .flatten_event(false)
        .with_ansi(false)
        .with_writer(file_writer);

    let initialized = tracing_subscriber::registry()
        .with(log_filter(config))
        .with(stdout_layer)
        .with(file_layer)
        .try_init();

    match initialized {
        Ok(()) => tracing::info!(
            data_source = ?config.data_source,
            ai_enabled = config.openai_api_key.is_some(),
            submission_model = %config.submission_model,
            chat_model = %config.chat_model,
            log_dir = %config.log_dir,
            "Logging initialized"
        ),
        // 이미 전역 구독자가 있는 경우 (테스트 등)
        Err(e) => tracing::debug!(error = %e, "Tracing subscriber already set"),
    }

    guard
}
