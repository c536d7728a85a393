mod common;

use axum::http::{header, StatusCode};
use common::*;
use formpilot_server::store::fixture::DEMO_EMBED_CODE;
use serde_json::json;
use tower::ServiceExt;

mod resolve {
    use super::*;

    #[tokio::test]
    async fn should_return_public_form_for_active_embed_code() {
        let app = seeded_app(None);

        let response = app
            .app()
            .oneshot(create_get_request(&format!("/api/embed/{}", DEMO_EMBED_CODE)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_response_body(response.into_body()).await;
        assert_eq!(body["isSuccess"], true);
        assert_eq!(body["result"]["title"], "Contact Us");
        assert_eq!(body["result"]["embedCode"], DEMO_EMBED_CODE);
        assert_eq!(body["result"]["fields"].as_array().unwrap().len(), 4);
        // 필드 순서 유지
        assert_eq!(body["result"]["fields"][0]["label"], "Name");
        assert_eq!(body["result"]["styling"]["primaryColor"], "#3b82f6");
        assert_eq!(body["result"]["styling"]["fontFamily"], "Inter");
    }

    #[tokio::test]
    async fn should_return_404_for_unknown_embed_code() {
        let app = seeded_app(None);

        let response = app
            .app()
            .oneshot(create_get_request("/api/embed/no-such-code"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = parse_response_body(response.into_body()).await;
        assert_eq!(body["isSuccess"], false);
        assert_eq!(body["code"], "COMMON404");
    }

    #[tokio::test]
    async fn should_hide_inactive_form_from_embed_and_public_routes() {
        // Arrange
        let app = seeded_app(None);
        let token = demo_token();
        let created = app
            .app()
            .oneshot(create_authed_json_request(
                "POST",
                "/api/forms",
                &token,
                json!({
                    "title": "Waitlist",
                    "embedCode": "waitlist",
                    "fields": [{ "label": "Email", "type": "email", "required": true }]
                }),
            ))
            .await
            .unwrap();
        let created = parse_response_body(created.into_body()).await;
        let form_id = created["result"]["id"].as_i64().unwrap();

        let unpublish = app
            .app()
            .oneshot(create_authed_json_request(
                "PUT",
                &format!("/api/forms/{}", form_id),
                &token,
                json!({
                    "title": "Waitlist",
                    "fields": [{ "label": "Email", "type": "email", "required": true }],
                    "isPublished": false
                }),
            ))
            .await
            .unwrap();
        assert_eq!(unpublish.status(), StatusCode::OK);

        // Act
        let by_code = app
            .app()
            .oneshot(create_get_request("/api/embed/waitlist"))
            .await
            .unwrap();
        let by_id = app
            .app()
            .oneshot(create_get_request(&format!("/api/public/forms/{}", form_id)))
            .await
            .unwrap();

        // Assert
        assert_eq!(by_code.status(), StatusCode::NOT_FOUND);
        let body = parse_response_body(by_code.into_body()).await;
        assert!(body["result"].is_null());
        assert_eq!(by_id.status(), StatusCode::NOT_FOUND);
    }
}

mod script {
    use super::*;

    #[tokio::test]
    async fn should_serve_loader_with_cache_headers() {
        let app = seeded_app(None);

        let response = app
            .app()
            .oneshot(create_get_request("/embed.js?id=42"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/javascript"
        );
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "public, max-age=3600"
        );
        let script = read_text(response.into_body()).await;
        assert!(script.contains("var formId = \"42\";"));
        assert!(script.contains("var baseUrl = \"http://localhost:3000\";"));
        assert!(script.contains("e.data.type === 'resize' && e.data.formId === formId"));
    }

    #[tokio::test]
    async fn should_return_400_without_form_id() {
        let app = seeded_app(None);

        let response = app
            .app()
            .oneshot(create_get_request("/embed.js"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_text(response.into_body()).await, "Missing form ID");
    }

    #[tokio::test]
    async fn should_reject_script_injection_in_form_id() {
        let app = seeded_app(None);

        let response = app
            .app()
            .oneshot(create_get_request("/embed.js?id=%22%3Balert(1)%3B%22"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_text(response.into_body()).await, "Invalid form ID");
    }
}
