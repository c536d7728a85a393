#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use formpilot_server::{
    config::AppConfig,
    create_app,
    domain::ai::{AiClient, AiClientTrait, CompletionRequest},
    state::AppState,
    storage::MemoryBlobStore,
    store::{fixture::DEMO_EXTERNAL_ID, FixtureDataSource},
    utils::{
        error::AppError,
        jwt::{encode_token, Claims},
    },
};
use http_body_util::BodyExt;
use serde_json::Value;

pub const TEST_SECRET_KEY: &str = "test-secret-key";

/// 미리 정한 답변을 돌려주고 받은 요청을 기록하는 AI 클라이언트
pub struct ScriptedAi {
    reply: Result<String, String>,
    pub calls: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedAi {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: Err("provider down".to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> CompletionRequest {
        self.calls.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl AiClientTrait for ScriptedAi {
    async fn complete(&self, request: CompletionRequest) -> Result<String, AppError> {
        self.calls.lock().unwrap().push(request);
        self.reply.clone().map_err(AppError::AiUnavailable)
    }

    async fn check_connectivity(&self) -> Result<(), AppError> {
        self.reply.as_ref().map(|_| ()).map_err(|e| AppError::AiUnavailable(e.clone()))
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<FixtureDataSource>,
    pub blobs: Arc<MemoryBlobStore>,
}

impl TestApp {
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// 데모 테넌트가 채워진 앱
pub fn seeded_app(ai: Option<AiClient>) -> TestApp {
    build_app(Arc::new(FixtureDataSource::seeded()), ai)
}

pub fn build_app(store: Arc<FixtureDataSource>, ai: Option<AiClient>) -> TestApp {
    let blobs = Arc::new(MemoryBlobStore::new("http://localhost:3000"));
    let state = AppState {
        store: store.clone(),
        ai,
        blobs: blobs.clone(),
        config: AppConfig::for_fixture(TEST_SECRET_KEY),
    };

    TestApp {
        router: create_app(state),
        store,
        blobs,
    }
}

pub fn token_for(external_id: &str, email: Option<&str>) -> String {
    let claims = Claims::new(external_id, email.map(str::to_string), 3600);
    encode_token(&claims, TEST_SECRET_KEY).unwrap()
}

pub fn demo_token() -> String {
    token_for(DEMO_EXTERNAL_ID, None)
}

pub async fn parse_response_body(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn read_text(body: Body) -> String {
    let bytes = body.collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn create_json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn create_authed_json_request(method: &str, uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn create_get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn create_authed_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

/// `file` 필드 하나를 담은 multipart 요청
pub fn create_upload_request(token: &str, file_name: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "formpilot-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/company/files")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(body))
        .unwrap()
}
