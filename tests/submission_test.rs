mod common;

use axum::http::StatusCode;
use common::*;
use formpilot_server::domain::ai::{AiClient, CompletionKind};
use formpilot_server::domain::submission::dto::{NO_FOLLOW_UP, YES_FOLLOW_UP};
use serde_json::{json, Value};
use tower::ServiceExt;

/// "Contact Us" 폼을 만들고 (form_id, embed_code)를 반환
async fn create_contact_form(app: &TestApp, embed_code: &str, prompt: Option<&str>) -> i64 {
    let token = demo_token();
    let created = app
        .app()
        .oneshot(create_authed_json_request(
            "POST",
            "/api/forms",
            &token,
            json!({
                "title": "Contact Us",
                "embedCode": embed_code,
                "fields": [
                    { "label": "name", "type": "text", "required": true },
                    { "label": "email", "type": "email", "required": true },
                    { "label": "message", "type": "textarea", "required": true }
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::OK);
    let form_id = parse_response_body(created.into_body()).await["result"]["id"]
        .as_i64()
        .unwrap();

    if let Some(prompt) = prompt {
        let saved = app
            .app()
            .oneshot(create_authed_json_request(
                "POST",
                &format!("/api/forms/{}/prompt", form_id),
                &token,
                json!({ "prompt": prompt }),
            ))
            .await
            .unwrap();
        assert_eq!(saved.status(), StatusCode::OK);
    }

    form_id
}

async fn list_submissions(app: &TestApp, form_id: i64) -> Vec<Value> {
    let response = app
        .app()
        .oneshot(create_authed_request(
            "GET",
            &format!("/api/forms/{}/submissions", form_id),
            &demo_token(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    parse_response_body(response.into_body()).await["result"]
        .as_array()
        .cloned()
        .unwrap()
}

fn contact_payload() -> Value {
    json!({
        "submissionData": { "name": "A", "email": "a@b.com", "message": "hi" }
    })
}

mod submit {
    use super::*;

    #[tokio::test]
    async fn should_store_payload_and_reply_with_one_model_call() {
        // Arrange
        let ai = ScriptedAi::replying("Thanks A, we'll be in touch!");
        let app = seeded_app(Some(ai.clone() as AiClient));
        let form_id = create_contact_form(&app, "contact-warm", Some("Reply warmly")).await;

        // Act
        let response = app
            .app()
            .oneshot(create_json_request(
                "POST",
                "/api/forms/submit/contact-warm",
                contact_payload(),
            ))
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_response_body(response.into_body()).await;
        assert_eq!(body["isSuccess"], true);
        assert_eq!(body["code"], "COMMON200");
        assert_eq!(body["result"]["aiResponse"], "Thanks A, we'll be in touch!");

        assert_eq!(ai.call_count(), 1);
        let call = ai.last_call();
        assert_eq!(call.kind, CompletionKind::SubmissionReply);
        assert!(call.max_tokens.is_some());
        let content = &call.messages[0].content;
        assert!(content.starts_with("Reply warmly"));
        assert!(
            content.contains("Form submission:\nname: A\nemail: a@b.com\nmessage: hi\n"),
            "fields should keep submitted order: {}",
            content
        );

        let submissions = list_submissions(&app, form_id).await;
        assert_eq!(submissions.len(), 1);
        let data = &submissions[0]["data"];
        assert_eq!(data["name"], "A");
        assert_eq!(data["email"], "a@b.com");
        assert_eq!(data["message"], "hi");
        assert_eq!(data["aiResponse"], "Thanks A, we'll be in touch!");
    }

    #[tokio::test]
    async fn should_keep_submission_when_model_fails() {
        // Arrange
        let ai = ScriptedAi::failing();
        let app = seeded_app(Some(ai.clone() as AiClient));
        let form_id = create_contact_form(&app, "contact-fail", Some("Reply warmly")).await;

        // Act
        let response = app
            .app()
            .oneshot(create_json_request(
                "POST",
                "/api/forms/submit/contact-fail",
                contact_payload(),
            ))
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_response_body(response.into_body()).await;
        assert_eq!(body["isSuccess"], true);
        assert_eq!(body["code"], "AI2001");
        assert!(body["result"]["submissionId"].as_i64().is_some());
        assert!(body["result"]["aiResponse"].is_null());
        assert_eq!(ai.call_count(), 1);

        let submissions = list_submissions(&app, form_id).await;
        assert_eq!(submissions.len(), 1);
        assert!(submissions[0]["data"].get("aiResponse").is_none());
    }

    #[tokio::test]
    async fn should_skip_model_without_prompt() {
        let ai = ScriptedAi::replying("unused");
        let app = seeded_app(Some(ai.clone() as AiClient));
        create_contact_form(&app, "contact-plain", None).await;

        let response = app
            .app()
            .oneshot(create_json_request(
                "POST",
                "/api/forms/submit/contact-plain",
                contact_payload(),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_response_body(response.into_body()).await;
        assert_eq!(body["code"], "COMMON200");
        assert!(body["result"]["aiResponse"].is_null());
        assert_eq!(ai.call_count(), 0);
    }

    #[tokio::test]
    async fn should_create_new_row_per_call() {
        let app = seeded_app(None);
        let form_id = create_contact_form(&app, "contact-twice", None).await;

        for _ in 0..2 {
            let response = app
                .app()
                .oneshot(create_json_request(
                    "POST",
                    "/api/forms/submit/contact-twice",
                    contact_payload(),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        assert_eq!(list_submissions(&app, form_id).await.len(), 2);
    }

    #[tokio::test]
    async fn should_capture_client_metadata() {
        let app = seeded_app(None);
        let form_id = create_contact_form(&app, "contact-meta", None).await;

        let mut request = create_json_request(
            "POST",
            "/api/forms/submit/contact-meta",
            contact_payload(),
        );
        request
            .headers_mut()
            .insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
        request
            .headers_mut()
            .insert("user-agent", "WidgetTest/1.0".parse().unwrap());
        let response = app.app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let submissions = list_submissions(&app, form_id).await;
        assert_eq!(submissions[0]["ip"], "203.0.113.7");
        assert_eq!(submissions[0]["userAgent"], "WidgetTest/1.0");
    }

    #[tokio::test]
    async fn should_return_404_for_unknown_embed_code() {
        let app = seeded_app(None);

        let response = app
            .app()
            .oneshot(create_json_request(
                "POST",
                "/api/forms/submit/missing",
                contact_payload(),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_reject_non_object_payload() {
        let app = seeded_app(None);
        create_contact_form(&app, "contact-bad", None).await;

        let response = app
            .app()
            .oneshot(create_json_request(
                "POST",
                "/api/forms/submit/contact-bad",
                json!({ "submissionData": ["not", "an", "object"] }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = parse_response_body(response.into_body()).await;
        assert_eq!(body["message"], "Invalid submission data");
    }
}

mod respond {
    use super::*;

    async fn submit_once(app: &TestApp, embed_code: &str) -> i64 {
        let response = app
            .app()
            .oneshot(create_json_request(
                "POST",
                &format!("/api/forms/submit/{}", embed_code),
                contact_payload(),
            ))
            .await
            .unwrap();
        parse_response_body(response.into_body()).await["result"]["submissionId"]
            .as_i64()
            .unwrap()
    }

    #[tokio::test]
    async fn should_record_choice_and_append_follow_up_chat() {
        // Arrange
        let ai = ScriptedAi::replying("unused");
        let app = seeded_app(Some(ai.clone() as AiClient));
        let form_id = create_contact_form(&app, "contact-yes", None).await;
        let submission_id = submit_once(&app, "contact-yes").await;

        // Act
        let response = app
            .app()
            .oneshot(create_json_request(
                "POST",
                "/api/ai/respond",
                json!({ "submissionId": submission_id, "response": "yes" }),
            ))
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_response_body(response.into_body()).await;
        assert_eq!(body["result"]["followUpMessage"], YES_FOLLOW_UP);
        assert_eq!(ai.call_count(), 0);

        let submissions = list_submissions(&app, form_id).await;
        assert_eq!(submissions[0]["userResponded"], true);
        assert_eq!(submissions[0]["userResponse"], "yes");

        let chat = app
            .app()
            .oneshot(create_get_request(&format!(
                "/api/forms/{}/chat?sessionId={}",
                form_id, submission_id
            )))
            .await
            .unwrap();
        let chat = parse_response_body(chat.into_body()).await;
        let messages = chat["result"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["sender"], "user");
        assert_eq!(messages[0]["message"], "yes");
        assert_eq!(messages[1]["sender"], "ai");
        assert_eq!(messages[1]["message"], YES_FOLLOW_UP);
    }

    #[tokio::test]
    async fn should_return_distinct_message_for_no() {
        let app = seeded_app(None);
        create_contact_form(&app, "contact-no", None).await;
        let submission_id = submit_once(&app, "contact-no").await;

        let response = app
            .app()
            .oneshot(create_json_request(
                "POST",
                "/api/ai/respond",
                json!({ "submissionId": submission_id, "response": "no" }),
            ))
            .await
            .unwrap();

        let body = parse_response_body(response.into_body()).await;
        assert_eq!(body["result"]["followUpMessage"], NO_FOLLOW_UP);
        assert_ne!(NO_FOLLOW_UP, YES_FOLLOW_UP);
    }

    #[tokio::test]
    async fn should_reject_unknown_choice() {
        let app = seeded_app(None);
        create_contact_form(&app, "contact-maybe", None).await;
        let submission_id = submit_once(&app, "contact-maybe").await;

        let response = app
            .app()
            .oneshot(create_json_request(
                "POST",
                "/api/ai/respond",
                json!({ "submissionId": submission_id, "response": "maybe" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_return_404_for_unknown_submission() {
        let app = seeded_app(None);

        let response = app
            .app()
            .oneshot(create_json_request(
                "POST",
                "/api/ai/respond",
                json!({ "submissionId": 999_999, "response": "yes" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
