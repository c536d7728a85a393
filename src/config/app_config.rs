use std::env;
use std::str::FromStr;

/// 기본 데이터 허용량 (MB)
pub const DEFAULT_MAX_DATA_ALLOWANCE_MB: f64 = 10.0;

/// 데이터 소스 종류
///
/// 시작 시 한 번 선택되며 요청마다 분기하지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSourceKind {
    /// MySQL (sea-orm)
    Database,
    /// 메모리 기반 데모 데이터
    Fixture,
}

impl FromStr for DataSourceKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "database" | "db" => Ok(DataSourceKind::Database),
            "fixture" | "mock" => Ok(DataSourceKind::Fixture),
            other => Err(ConfigError::InvalidDataSource(other.to_string())),
        }
    }
}

/// 애플리케이션 설정
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    pub data_source: DataSourceKind,
    pub database_url: Option<String>,
    /// 시작 시 테이블/인덱스 생성 여부
    pub db_schema_update: bool,
    pub jwt_secret: String,

    // AI Service
    pub openai_api_key: Option<String>,
    pub submission_model: String,
    pub chat_model: String,

    /// 임베드 스크립트와 공개 폼 URL의 기준 주소
    pub app_base_url: String,
    /// 업로드 파일 저장 디렉토리
    pub upload_dir: String,
    pub default_max_data_allowance_mb: f64,
    pub log_dir: String,
    /// `RUST_LOG` 지시어 (없으면 기본 필터)
    pub log_filter: Option<String>,
}

impl AppConfig {
    /// 환경 변수에서 설정 로드
    pub fn from_env() -> Result<Self, ConfigError> {
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let data_source: DataSourceKind = env::var("DATA_SOURCE")
            .unwrap_or_else(|_| "database".to_string())
            .parse()?;

        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());
        if data_source == DataSourceKind::Database && database_url.is_none() {
            return Err(ConfigError::MissingDatabaseUrl);
        }

        let db_schema_update = env::var("DB_SCHEMA_UPDATE")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .unwrap_or_else(|_| {
                tracing::warn!(
                    "Invalid DB_SCHEMA_UPDATE value, defaulting to false. Use 'true' or 'false'."
                );
                false
            });

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET is not set. Always set it in production.");
            "secret".to_string()
        });

        let openai_api_key = env::var("OPENAI_API_KEY").ok().filter(|v| !v.is_empty());
        if openai_api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY is not set. AI replies are disabled.");
        }

        let submission_model =
            env::var("OPENAI_SUBMISSION_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string());
        let chat_model = env::var("OPENAI_CHAT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let app_base_url = env::var("APP_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());

        let default_max_data_allowance_mb = match env::var("DEFAULT_MAX_DATA_ALLOWANCE_MB") {
            Ok(raw) => raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v > 0.0)
                .ok_or(ConfigError::InvalidAllowance)?,
            Err(_) => DEFAULT_MAX_DATA_ALLOWANCE_MB,
        };

        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());
        let log_filter = env::var("RUST_LOG").ok().filter(|v| !v.trim().is_empty());

        Ok(Self {
            server_port,
            data_source,
            database_url,
            db_schema_update,
            jwt_secret,
            openai_api_key,
            submission_model,
            chat_model,
            app_base_url,
            upload_dir,
            default_max_data_allowance_mb,
            log_dir,
            log_filter,
        })
    }

    /// 테스트와 데모용 기본 설정 (메모리 데이터 소스, AI 비활성)
    pub fn for_fixture(jwt_secret: impl Into<String>) -> Self {
        Self {
            server_port: 8080,
            data_source: DataSourceKind::Fixture,
            database_url: None,
            db_schema_update: false,
            jwt_secret: jwt_secret.into(),
            openai_api_key: None,
            submission_model: "gpt-3.5-turbo".to_string(),
            chat_model: "gpt-4o-mini".to_string(),
            app_base_url: "http://localhost:3000".to_string(),
            upload_dir: "uploads".to_string(),
            default_max_data_allowance_mb: DEFAULT_MAX_DATA_ALLOWANCE_MB,
            log_dir: "logs".to_string(),
            log_filter: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number")]
    InvalidPort,
    #[error("Unknown DATA_SOURCE '{0}', expected 'database' or 'fixture'")]
    InvalidDataSource(String),
    #[error("DATABASE_URL is required when DATA_SOURCE=database")]
    MissingDatabaseUrl,
    #[error("DEFAULT_MAX_DATA_ALLOWANCE_MB must be a positive number")]
    InvalidAllowance,
}
