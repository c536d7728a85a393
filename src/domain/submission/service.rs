use std::collections::HashMap;

use serde_json::Value;
use tracing::{error, info, warn};

use crate::domain::ai::prompt::{submission_reply_messages, SUBMISSION_REPLY_MAX_TOKENS};
use crate::domain::ai::{AiOutcome, CompletionKind, CompletionRequest};
use crate::domain::chat::entity::form_chat::ChatSender;
use crate::domain::embed::service::EmbedService;
use crate::domain::form::service::FormService;
use crate::state::AppState;
use crate::store::{NewChatMessage, NewSubmission};
use crate::utils::auth::AuthUser;
use crate::utils::error::AppError;

use super::dto::{
    follow_up_message, ClientMeta, RespondRequest, RespondResponse, SubmissionItem,
    SubmitFormResponse,
};
use super::entity::form_submission::AI_RESPONSE_KEY;

pub struct SubmissionService;

impl SubmissionService {
    /// 폼 제출
    ///
    /// 제출은 AI 결과와 관계없이 정확히 한 번 저장됩니다.
    /// AI 답변은 최선 노력이며 실패하면 `AiOutcome::Failed`로 알립니다.
    pub async fn submit(
        state: &AppState,
        embed_code: &str,
        submission_data: Value,
        meta: ClientMeta,
    ) -> Result<(SubmitFormResponse, AiOutcome), AppError> {
        // 1. 제출 데이터 형식 검증
        let Value::Object(payload) = submission_data else {
            return Err(AppError::bad_request("Invalid submission data"));
        };

        // 2. 게시된 폼 조회
        let record = EmbedService::resolve(state, embed_code).await?;
        let form_id = record.form.form_id;
        let prompt = state
            .store
            .find_prompt(form_id)
            .await?
            .and_then(|p| p.prompt)
            .filter(|text| !text.trim().is_empty());

        // 3. 제출 저장
        let submission = state
            .store
            .create_submission(NewSubmission {
                form_id,
                data: Value::Object(payload.clone()),
                ip: meta.ip,
                user_agent: meta.user_agent,
            })
            .await?;
        let submission_id = submission.submission_id;

        info!(form_id, submission_id, "Form submission stored");

        // 4. AI 답변 (프롬프트와 클라이언트가 모두 있을 때만)
        let (Some(prompt), Some(ai)) = (prompt, state.ai.as_ref()) else {
            return Ok((
                SubmitFormResponse {
                    submission_id,
                    ai_response: None,
                },
                AiOutcome::Skipped,
            ));
        };

        let request = CompletionRequest {
            kind: CompletionKind::SubmissionReply,
            messages: submission_reply_messages(&prompt, &payload),
            max_tokens: Some(SUBMISSION_REPLY_MAX_TOKENS),
        };

        let reply = match ai.complete(request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(form_id, submission_id, error = %e, "AI reply failed, submission kept without reply");
                return Ok((
                    SubmitFormResponse {
                        submission_id,
                        ai_response: None,
                    },
                    AiOutcome::Failed,
                ));
            }
        };

        // 5. 답변을 제출 데이터에 병합
        let mut merged = payload;
        merged.insert(AI_RESPONSE_KEY.to_string(), Value::String(reply.clone()));
        if let Err(e) = state
            .store
            .update_submission_data(submission_id, Value::Object(merged))
            .await
        {
            error!(form_id, submission_id, error = %e, "Failed to merge AI reply into submission");
        }

        Ok((
            SubmitFormResponse {
                submission_id,
                ai_response: Some(reply),
            },
            AiOutcome::Replied,
        ))
    }

    /// 예/아니오 팔로업
    ///
    /// 응답을 기록하고 제출 ID를 세션으로 하는 채팅에 사용자/AI 메시지를 남깁니다.
    /// 모델은 호출하지 않습니다.
    pub async fn respond(
        state: &AppState,
        req: RespondRequest,
    ) -> Result<RespondResponse, AppError> {
        let choice = req
            .choice()
            .ok_or_else(|| AppError::bad_request("Response must be 'yes' or 'no'"))?;

        let submission = state
            .store
            .record_user_response(req.submission_id, choice)
            .await?
            .ok_or_else(|| {
                warn!(submission_id = req.submission_id, "Response for unknown submission");
                AppError::not_found("Submission not found")
            })?;

        let session_id = submission.submission_id.to_string();
        let follow_up = follow_up_message(choice);

        state
            .store
            .append_chat_message(NewChatMessage {
                form_id: submission.form_id,
                session_id: session_id.clone(),
                sender: ChatSender::User,
                message: choice.as_str().to_string(),
            })
            .await?;
        state
            .store
            .append_chat_message(NewChatMessage {
                form_id: submission.form_id,
                session_id: session_id.clone(),
                sender: ChatSender::Ai,
                message: follow_up.to_string(),
            })
            .await?;

        info!(
            submission_id = submission.submission_id,
            form_id = submission.form_id,
            session_id = %session_id,
            response = choice.as_str(),
            "User response recorded"
        );

        Ok(RespondResponse {
            follow_up_message: follow_up.to_string(),
        })
    }

    /// 제출 목록 (최신순, 필드 라벨 치환본 포함)
    pub async fn list_submissions(
        state: &AppState,
        auth: &AuthUser,
        form_id: i64,
    ) -> Result<Vec<SubmissionItem>, AppError> {
        let record = FormService::find_owned(state, auth, form_id).await?;
        let labels: HashMap<String, String> = record
            .fields
            .iter()
            .map(|field| (field.form_field_id.to_string(), field.label.clone()))
            .collect();

        let submissions = state.store.list_submissions(form_id).await?;

        Ok(submissions
            .into_iter()
            .map(|submission| SubmissionItem::new(submission, &labels))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::config::AppConfig;
    use crate::domain::ai::client::MockAiClientTrait;
    use crate::domain::ai::AiClient;
    use crate::domain::submission::dto::{NO_FOLLOW_UP, YES_FOLLOW_UP};
    use crate::storage::MemoryBlobStore;
    use crate::store::fixture::DEMO_EMBED_CODE;
    use crate::store::{DataSource, FixtureDataSource};

    fn meta() -> ClientMeta {
        ClientMeta {
            ip: "127.0.0.1".into(),
            user_agent: "test".into(),
        }
    }

    fn state(store: Arc<FixtureDataSource>, ai: Option<MockAiClientTrait>) -> AppState {
        AppState {
            store,
            ai: ai.map(|mock| -> AiClient { Arc::new(mock) }),
            blobs: Arc::new(MemoryBlobStore::new("http://localhost:3000")),
            config: AppConfig::for_fixture("test-secret"),
        }
    }

    #[tokio::test]
    async fn should_merge_ai_reply_into_stored_submission() {
        // Arrange
        let store = Arc::new(FixtureDataSource::seeded());
        let mut mock = MockAiClientTrait::new();
        mock.expect_complete()
            .withf(|req| {
                req.kind == CompletionKind::SubmissionReply
                    && req.max_tokens == Some(SUBMISSION_REPLY_MAX_TOKENS)
            })
            .times(1)
            .returning(|_| Ok("Thanks for reaching out!".to_string()));
        let state = state(store.clone(), Some(mock));

        // Act
        let (response, outcome) = SubmissionService::submit(
            &state,
            DEMO_EMBED_CODE,
            json!({ "name": "Ada" }),
            meta(),
        )
        .await
        .unwrap();

        // Assert
        assert_eq!(outcome, AiOutcome::Replied);
        assert_eq!(response.ai_response.as_deref(), Some("Thanks for reaching out!"));
        let stored = store
            .find_submission(response.submission_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.data["name"], "Ada");
        assert_eq!(stored.ai_response(), Some("Thanks for reaching out!"));
    }

    #[tokio::test]
    async fn should_keep_submission_when_ai_fails() {
        // Arrange
        let store = Arc::new(FixtureDataSource::seeded());
        let mut mock = MockAiClientTrait::new();
        mock.expect_complete()
            .times(1)
            .returning(|_| Err(AppError::AiUnavailable("timed out".into())));
        let state = state(store.clone(), Some(mock));

        // Act
        let (response, outcome) = SubmissionService::submit(
            &state,
            DEMO_EMBED_CODE,
            json!({ "name": "Ada" }),
            meta(),
        )
        .await
        .unwrap();

        // Assert
        assert_eq!(outcome, AiOutcome::Failed);
        assert!(response.ai_response.is_none());
        let stored = store
            .find_submission(response.submission_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.data, json!({ "name": "Ada" }));
    }

    #[tokio::test]
    async fn should_skip_ai_without_client() {
        let state = state(Arc::new(FixtureDataSource::seeded()), None);

        let (response, outcome) =
            SubmissionService::submit(&state, DEMO_EMBED_CODE, json!({ "a": 1 }), meta())
                .await
                .unwrap();

        assert_eq!(outcome, AiOutcome::Skipped);
        assert!(response.ai_response.is_none());
    }

    #[tokio::test]
    async fn should_reject_non_object_payload_without_storing() {
        // Arrange
        let store = Arc::new(FixtureDataSource::seeded());
        let state = state(store.clone(), None);
        let form_id = store
            .find_active_form_by_embed_code(DEMO_EMBED_CODE)
            .await
            .unwrap()
            .unwrap()
            .form
            .form_id;

        // Act
        let result =
            SubmissionService::submit(&state, DEMO_EMBED_CODE, json!(["not", "an", "object"]), meta())
                .await;

        // Assert
        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert!(store.list_submissions(form_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_record_choice_and_append_chat_pair() {
        // Arrange
        let store = Arc::new(FixtureDataSource::seeded());
        let state = state(store.clone(), None);
        let (submitted, _) =
            SubmissionService::submit(&state, DEMO_EMBED_CODE, json!({ "a": 1 }), meta())
                .await
                .unwrap();

        // Act
        let yes = SubmissionService::respond(
            &state,
            RespondRequest {
                submission_id: submitted.submission_id,
                response: "yes".into(),
            },
        )
        .await
        .unwrap();

        // Assert
        assert_eq!(yes.follow_up_message, YES_FOLLOW_UP);
        let stored = store
            .find_submission(submitted.submission_id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.user_responded);
        let chat = store
            .list_chat_messages(stored.form_id, &submitted.submission_id.to_string())
            .await
            .unwrap();
        assert_eq!(chat.len(), 2);
        assert_eq!(chat[0].sender, ChatSender::User);
        assert_eq!(chat[0].message, "yes");
        assert_eq!(chat[1].sender, ChatSender::Ai);
        assert_eq!(chat[1].message, YES_FOLLOW_UP);
    }

    #[tokio::test]
    async fn should_use_distinct_message_for_no() {
        let store = Arc::new(FixtureDataSource::seeded());
        let state = state(store, None);
        let (submitted, _) =
            SubmissionService::submit(&state, DEMO_EMBED_CODE, json!({}), meta())
                .await
                .unwrap();

        let no = SubmissionService::respond(
            &state,
            RespondRequest {
                submission_id: submitted.submission_id,
                response: "no".into(),
            },
        )
        .await
        .unwrap();

        assert_eq!(no.follow_up_message, NO_FOLLOW_UP);
    }

    #[tokio::test]
    async fn should_reject_unknown_submission_and_invalid_choice() {
        let state = state(Arc::new(FixtureDataSource::seeded()), None);

        let unknown = SubmissionService::respond(
            &state,
            RespondRequest {
                submission_id: 9999,
                response: "yes".into(),
            },
        )
        .await;
        let invalid = SubmissionService::respond(
            &state,
            RespondRequest {
                submission_id: 1,
                response: "maybe".into(),
            },
        )
        .await;

        assert!(matches!(unknown, Err(AppError::NotFound(_))));
        assert!(matches!(invalid, Err(AppError::BadRequest(_))));
    }
}
