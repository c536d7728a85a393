use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tokio::time::timeout;

use super::dto::{CheckResult, HealthChecks, HealthState, HealthStatus};
use crate::domain::ai::AiClient;
use crate::state::AppState;
use crate::store::DataSource;

/// 서버 시작 시간 (전역)
static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// AI 체크 결과 캐시 (전역)
static AI_CHECK_CACHE: std::sync::OnceLock<Arc<RwLock<Option<CachedCheck>>>> =
    std::sync::OnceLock::new();

/// 헬스체크 타임아웃 (5초)
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Degraded 상태 임계값 (2초)
const DEGRADED_THRESHOLD: Duration = Duration::from_secs(2);

/// AI 체크 캐시 유효 시간 (30초)
const CACHE_DURATION: Duration = Duration::from_secs(30);

struct CachedCheck {
    result: CheckResult,
    cached_at: Instant,
}

fn ai_check_cache() -> Arc<RwLock<Option<CachedCheck>>> {
    AI_CHECK_CACHE
        .get_or_init(|| Arc::new(RwLock::new(None)))
        .clone()
}

/// 서버 시작 시간 초기화
///
/// main 함수에서 서버 시작 시 호출해야 합니다.
pub fn init_start_time() {
    START_TIME.get_or_init(Instant::now);
}

pub fn uptime_secs() -> u64 {
    START_TIME.get().map(|t| t.elapsed().as_secs()).unwrap_or(0)
}

/// 데이터 소스와 AI 연결 상태 점검
pub async fn check_health(state: &AppState) -> HealthStatus {
    let data_source = check_data_source(state.store.as_ref()).await;
    let openai_api = match &state.ai {
        Some(ai) => Some(check_openai_cached(ai).await),
        None => None,
    };

    HealthStatus {
        status: determine_health_state(&data_source, openai_api.as_ref()),
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: uptime_secs(),
        checks: HealthChecks {
            data_source,
            openai_api,
        },
    }
}

/// 데이터 소스 장애만 Unhealthy. AI 장애는 답변만 빠지므로 Degraded.
fn determine_health_state(data_source: &CheckResult, ai: Option<&CheckResult>) -> HealthState {
    if !data_source.status {
        return HealthState::Unhealthy;
    }

    let slow = |check: &CheckResult| {
        check
            .latency_ms
            .map(|latency| latency >= DEGRADED_THRESHOLD.as_millis() as u64)
            .unwrap_or(false)
    };

    match ai {
        Some(check) if !check.status || slow(check) => HealthState::Degraded,
        _ if slow(data_source) => HealthState::Degraded,
        _ => HealthState::Healthy,
    }
}

async fn check_data_source(store: &dyn DataSource) -> CheckResult {
    let start = Instant::now();
    let result = timeout(HEALTH_CHECK_TIMEOUT, store.ping()).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(Ok(())) => CheckResult::success(latency_ms),
        Ok(Err(e)) => {
            tracing::error!(latency_ms, error = %e, "Data source health check failed");
            CheckResult::failure(latency_ms, "data source unavailable".to_string())
        }
        Err(_) => {
            tracing::error!("Data source health check timed out");
            CheckResult::timeout(HEALTH_CHECK_TIMEOUT.as_millis() as u64)
        }
    }
}

/// OpenAI 연결 상태 확인 (캐싱 적용)
async fn check_openai_cached(ai: &AiClient) -> CheckResult {
    let cache = ai_check_cache();

    {
        let cached = cache.read().await;
        if let Some(ref c) = *cached {
            if c.cached_at.elapsed() < CACHE_DURATION {
                tracing::debug!(
                    cache_age_secs = c.cached_at.elapsed().as_secs(),
                    "Using cached AI health check result"
                );
                return c.result.clone();
            }
        }
    }

    let result = check_openai_fresh(ai).await;

    {
        let mut cached = cache.write().await;
        *cached = Some(CachedCheck {
            result: result.clone(),
            cached_at: Instant::now(),
        });
    }

    result
}

async fn check_openai_fresh(ai: &AiClient) -> CheckResult {
    let start = Instant::now();
    let result = timeout(HEALTH_CHECK_TIMEOUT, ai.check_connectivity()).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(Ok(())) => {
            tracing::info!(latency_ms, "OpenAI health check passed");
            CheckResult::success(latency_ms)
        }
        Ok(Err(e)) => {
            tracing::warn!(latency_ms, error = %e, "OpenAI health check failed");
            CheckResult::failure(latency_ms, e.to_string())
        }
        Err(_) => {
            tracing::warn!("OpenAI health check timed out");
            CheckResult::timeout(HEALTH_CHECK_TIMEOUT.as_millis() as u64)
        }
    }
}
