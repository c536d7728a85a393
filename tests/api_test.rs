mod common;

use axum::http::StatusCode;
use common::*;
use formpilot_server::domain::ai::AiClient;
use tower::ServiceExt;

// ===== Health Check Tests =====

mod health {
    use super::*;

    #[tokio::test]
    async fn should_report_healthy_without_ai_key() {
        let app = seeded_app(None);

        let response = app.app().oneshot(create_get_request("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_response_body(response.into_body()).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["checks"]["dataSource"]["status"], true);
        assert!(body["checks"].get("openaiApi").is_none());
    }

    #[tokio::test]
    async fn should_report_degraded_when_ai_unreachable() {
        let app = seeded_app(Some(ScriptedAi::failing() as AiClient));

        let response = app.app().oneshot(create_get_request("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_response_body(response.into_body()).await;
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["checks"]["openaiApi"]["status"], false);
    }
}

// ===== API Docs Tests =====

mod docs {
    use super::*;

    #[tokio::test]
    async fn should_serve_openapi_document() {
        let app = seeded_app(None);

        let response = app
            .app()
            .oneshot(create_get_request("/api-docs/openapi.json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_response_body(response.into_body()).await;
        assert!(body["paths"]["/api/forms/submit/{embed_code}"]["post"].is_object());
        assert!(body["paths"]["/api/company/files"]["delete"].is_object());
        assert!(body["components"]["securitySchemes"]["bearer_auth"].is_object());
    }
}

// ===== Request ID Tests =====

mod request_id {
    use super::*;

    #[tokio::test]
    async fn should_echo_incoming_request_id() {
        let app = seeded_app(None);
        let mut request = create_get_request("/health");
        request
            .headers_mut()
            .insert("x-request-id", "req-123".parse().unwrap());

        let response = app.app().oneshot(request).await.unwrap();

        assert_eq!(response.headers()["x-request-id"], "req-123");
    }

    #[tokio::test]
    async fn should_issue_request_id_on_error_responses() {
        let app = seeded_app(None);

        let response = app
            .app()
            .oneshot(create_get_request("/api/embed/unknown"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let id = response.headers()["x-request-id"].to_str().unwrap();
        assert!(!id.is_empty());
    }
}
