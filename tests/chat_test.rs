mod common;

use axum::http::StatusCode;
use chrono::NaiveDateTime;
use common::*;
use formpilot_server::domain::ai::{AiClient, CompletionKind, PromptRole};
use formpilot_server::store::fixture::DEMO_EMBED_CODE;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn demo_form_id(app: &TestApp) -> i64 {
    let response = app
        .app()
        .oneshot(create_get_request(&format!("/api/embed/{}", DEMO_EMBED_CODE)))
        .await
        .unwrap();
    parse_response_body(response.into_body()).await["result"]["id"]
        .as_i64()
        .unwrap()
}

async fn post_chat(app: &TestApp, form_id: i64, body: Value) -> (StatusCode, Value) {
    let response = app
        .app()
        .oneshot(create_json_request(
            "POST",
            &format!("/api/forms/{}/chat", form_id),
            body,
        ))
        .await
        .unwrap();
    let status = response.status();
    (status, parse_response_body(response.into_body()).await)
}

async fn list_chat(app: &TestApp, uri: &str) -> Vec<Value> {
    let response = app.app().oneshot(create_get_request(uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    parse_response_body(response.into_body()).await["result"]
        .as_array()
        .cloned()
        .unwrap()
}

#[tokio::test]
async fn should_alternate_user_and_ai_messages_in_order() {
    // Arrange
    let ai = ScriptedAi::replying("Happy to help!");
    let app = seeded_app(Some(ai.clone() as AiClient));
    let form_id = demo_form_id(&app).await;

    // Act
    for text in ["Hi", "What do you charge?", "Thanks"] {
        let (status, body) = post_chat(
            &app,
            form_id,
            json!({ "sessionId": "visitor-1", "sender": "user", "message": text }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], "COMMON200");
        let exchange = body["result"].as_array().unwrap();
        assert_eq!(exchange.len(), 2);
        assert_eq!(exchange[0]["message"], text);
        assert_eq!(exchange[1]["sender"], "ai");
    }

    // Assert
    let messages = list_chat(
        &app,
        &format!("/api/forms/{}/chat?sessionId=visitor-1", form_id),
    )
    .await;
    assert_eq!(messages.len(), 6);
    for (index, message) in messages.iter().enumerate() {
        let expected = if index % 2 == 0 { "user" } else { "ai" };
        assert_eq!(message["sender"], expected);
    }
    let timestamps: Vec<NaiveDateTime> = messages
        .iter()
        .map(|m| serde_json::from_value(m["createdAt"].clone()).unwrap())
        .collect();
    assert!(timestamps.windows(2).all(|pair| pair[0] < pair[1]));

    assert_eq!(ai.call_count(), 3);
    let last = ai.last_call();
    assert_eq!(last.kind, CompletionKind::Chat);
    // 시스템 프롬프트 + 직전까지의 5개 메시지
    assert_eq!(last.messages.len(), 6);
    assert_eq!(last.messages[0].role, PromptRole::System);
    assert!(last.messages[0].content.contains("Acme Studio"));
    assert!(last.messages[0].content.contains("discovery call"));
    assert_eq!(last.messages[5].role, PromptRole::User);
    assert_eq!(last.messages[5].content, "Thanks");
}

#[tokio::test]
async fn should_keep_sessions_separate_and_default_session_id() {
    let app = seeded_app(None);
    let form_id = demo_form_id(&app).await;

    post_chat(&app, form_id, json!({ "sender": "user", "message": "default one" })).await;
    post_chat(
        &app,
        form_id,
        json!({ "sessionId": "other", "sender": "user", "message": "other one" }),
    )
    .await;

    let default_session = list_chat(&app, &format!("/api/forms/{}/chat", form_id)).await;
    assert_eq!(default_session.len(), 1);
    assert_eq!(default_session[0]["sessionId"], "default");
    assert_eq!(default_session[0]["message"], "default one");

    let empty = list_chat(
        &app,
        &format!("/api/forms/{}/chat?sessionId=never-used", form_id),
    )
    .await;
    assert!(empty.is_empty());
}

#[tokio::test]
async fn should_store_ai_sender_message_without_model_call() {
    let ai = ScriptedAi::replying("unused");
    let app = seeded_app(Some(ai.clone() as AiClient));
    let form_id = demo_form_id(&app).await;

    let (status, body) = post_chat(
        &app,
        form_id,
        json!({ "sessionId": "s", "sender": "ai", "message": "Welcome!" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["result"].is_object());
    assert_eq!(body["result"]["sender"], "ai");
    assert_eq!(ai.call_count(), 0);
}

#[tokio::test]
async fn should_keep_user_message_when_model_fails() {
    let ai = ScriptedAi::failing();
    let app = seeded_app(Some(ai.clone() as AiClient));
    let form_id = demo_form_id(&app).await;

    let (status, body) = post_chat(
        &app,
        form_id,
        json!({ "sessionId": "s", "sender": "user", "message": "Hello?" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "AI2001");
    assert_eq!(body["result"].as_array().unwrap().len(), 1);

    let messages = list_chat(&app, &format!("/api/forms/{}/chat?sessionId=s", form_id)).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["sender"], "user");
}

#[tokio::test]
async fn should_validate_chat_request() {
    let app = seeded_app(None);
    let form_id = demo_form_id(&app).await;

    let (empty_status, _) = post_chat(
        &app,
        form_id,
        json!({ "sessionId": "s", "sender": "user", "message": "" }),
    )
    .await;
    let (sender_status, _) = post_chat(
        &app,
        form_id,
        json!({ "sessionId": "s", "sender": "bot", "message": "hi" }),
    )
    .await;
    let (missing_status, _) = post_chat(
        &app,
        999_999,
        json!({ "sessionId": "s", "sender": "user", "message": "hi" }),
    )
    .await;

    assert_eq!(empty_status, StatusCode::BAD_REQUEST);
    assert_eq!(sender_status, StatusCode::BAD_REQUEST);
    assert_eq!(missing_status, StatusCode::NOT_FOUND);
}
