use tracing::{info, warn};

use crate::domain::ai::prompt::{chat_system_prompt, chat_transcript};
use crate::domain::ai::{AiClient, AiOutcome, CompletionKind, CompletionRequest};
use crate::state::AppState;
use crate::store::{FormRecord, NewChatMessage};
use crate::utils::error::AppError;

use super::dto::{ChatMessageResponse, PostChatRequest, PostChatResult};
use super::entity::form_chat::ChatSender;

pub struct ChatService;

impl ChatService {
    /// 세션 메시지 목록 (시간순)
    pub async fn list_messages(
        state: &AppState,
        form_id: i64,
        session_id: &str,
    ) -> Result<Vec<ChatMessageResponse>, AppError> {
        Self::find_form(state, form_id).await?;

        let messages = state.store.list_chat_messages(form_id, session_id).await?;

        Ok(messages.into_iter().map(ChatMessageResponse::from).collect())
    }

    /// 메시지 전송
    ///
    /// 수신한 메시지는 항상 먼저 저장합니다. 사용자 메시지일 때만 세션 전체 기록으로
    /// 모델을 한 번 호출하고 답변을 `ai` 메시지로 저장합니다.
    pub async fn post_message(
        state: &AppState,
        form_id: i64,
        req: PostChatRequest,
    ) -> Result<(PostChatResult, AiOutcome), AppError> {
        let record = Self::find_form(state, form_id).await?;

        // 1. 수신 메시지 저장
        let incoming = state
            .store
            .append_chat_message(NewChatMessage {
                form_id,
                session_id: req.session_id.clone(),
                sender: req.sender,
                message: req.message,
            })
            .await?;
        let incoming = ChatMessageResponse::from(incoming);

        if req.sender != ChatSender::User {
            return Ok((PostChatResult::Single(incoming), AiOutcome::Skipped));
        }

        let Some(ai) = state.ai.as_ref() else {
            return Ok((PostChatResult::Exchange(vec![incoming]), AiOutcome::Skipped));
        };

        // 2. 답변 생성 (실패 시 사용자 메시지만 반환)
        let reply = match Self::generate_reply(state, ai, &record, &req.session_id).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(
                    form_id,
                    session_id = %req.session_id,
                    error = %e,
                    "Chat reply unavailable, returning user message only"
                );
                return Ok((PostChatResult::Exchange(vec![incoming]), AiOutcome::Failed));
            }
        };

        // 3. 답변 저장
        let answer = state
            .store
            .append_chat_message(NewChatMessage {
                form_id,
                session_id: req.session_id.clone(),
                sender: ChatSender::Ai,
                message: reply,
            })
            .await?;

        info!(form_id, session_id = %req.session_id, "Chat exchange stored");

        Ok((
            PostChatResult::Exchange(vec![incoming, ChatMessageResponse::from(answer)]),
            AiOutcome::Replied,
        ))
    }

    /// 회사 프로필, 프롬프트, 세션 기록으로 한 번 호출합니다.
    async fn generate_reply(
        state: &AppState,
        ai: &AiClient,
        record: &FormRecord,
        session_id: &str,
    ) -> Result<String, AppError> {
        let form_id = record.form.form_id;
        let company = match record.form.company_id {
            Some(company_id) => state.store.find_company(company_id).await?,
            None => None,
        };
        let prompt = state.store.find_prompt(form_id).await?;
        let history = state.store.list_chat_messages(form_id, session_id).await?;

        let system_prompt = chat_system_prompt(company.as_ref(), prompt.as_ref());

        ai.complete(CompletionRequest {
            kind: CompletionKind::Chat,
            messages: chat_transcript(&system_prompt, &history),
            max_tokens: None,
        })
        .await
    }

    async fn find_form(state: &AppState, form_id: i64) -> Result<FormRecord, AppError> {
        state
            .store
            .find_form(form_id)
            .await?
            .ok_or_else(|| AppError::not_found("Form not found"))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::AppConfig;
    use crate::domain::ai::client::MockAiClientTrait;
    use crate::domain::ai::{PromptMessage, PromptRole};
    use crate::storage::MemoryBlobStore;
    use crate::store::fixture::DEMO_EMBED_CODE;
    use crate::store::{DataSource, FixtureDataSource};

    fn state(store: Arc<FixtureDataSource>, ai: Option<MockAiClientTrait>) -> AppState {
        AppState {
            store,
            ai: ai.map(|mock| -> AiClient { Arc::new(mock) }),
            blobs: Arc::new(MemoryBlobStore::new("http://localhost:3000")),
            config: AppConfig::for_fixture("test-secret"),
        }
    }

    async fn demo_form_id(store: &FixtureDataSource) -> i64 {
        store
            .find_active_form_by_embed_code(DEMO_EMBED_CODE)
            .await
            .unwrap()
            .unwrap()
            .form
            .form_id
    }

    fn user_message(session_id: &str, text: &str) -> PostChatRequest {
        PostChatRequest {
            session_id: session_id.into(),
            sender: ChatSender::User,
            message: text.into(),
        }
    }

    #[tokio::test]
    async fn should_send_full_transcript_to_model() {
        // Arrange
        let store = Arc::new(FixtureDataSource::seeded());
        let form_id = demo_form_id(&store).await;
        let mut mock = MockAiClientTrait::new();
        mock.expect_complete()
            .withf(|req| {
                let roles: Vec<PromptRole> = req.messages.iter().map(|m| m.role).collect();
                req.kind == CompletionKind::Chat
                    && roles == vec![PromptRole::System, PromptRole::User]
                    && req.messages[0].content.starts_with("Business: Acme Studio")
                    && req.messages[1] == PromptMessage::user("Do you ship abroad?")
            })
            .times(1)
            .returning(|_| Ok("Yes, worldwide.".to_string()));
        let state = state(store.clone(), Some(mock));

        // Act
        let (result, outcome) =
            ChatService::post_message(&state, form_id, user_message("s1", "Do you ship abroad?"))
                .await
                .unwrap();

        // Assert
        assert_eq!(outcome, AiOutcome::Replied);
        let PostChatResult::Exchange(messages) = result else {
            panic!("user message should produce an exchange");
        };
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].sender, ChatSender::Ai);
        assert_eq!(messages[1].message, "Yes, worldwide.");
    }

    #[tokio::test]
    async fn should_keep_user_message_when_model_fails() {
        // Arrange
        let store = Arc::new(FixtureDataSource::seeded());
        let form_id = demo_form_id(&store).await;
        let mut mock = MockAiClientTrait::new();
        mock.expect_complete()
            .times(1)
            .returning(|_| Err(AppError::AiUnavailable("rate limited".into())));
        let state = state(store.clone(), Some(mock));

        // Act
        let (result, outcome) =
            ChatService::post_message(&state, form_id, user_message("s1", "hello"))
                .await
                .unwrap();

        // Assert
        assert_eq!(outcome, AiOutcome::Failed);
        assert!(matches!(result, PostChatResult::Exchange(ref m) if m.len() == 1));
        let stored = store.list_chat_messages(form_id, "s1").await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].message, "hello");
    }

    #[tokio::test]
    async fn should_not_call_model_for_ai_sender() {
        // Arrange
        let store = Arc::new(FixtureDataSource::seeded());
        let form_id = demo_form_id(&store).await;
        let mut mock = MockAiClientTrait::new();
        mock.expect_complete().times(0);
        let state = state(store, Some(mock));

        // Act
        let (result, outcome) = ChatService::post_message(
            &state,
            form_id,
            PostChatRequest {
                session_id: "s1".into(),
                sender: ChatSender::Ai,
                message: "Welcome!".into(),
            },
        )
        .await
        .unwrap();

        // Assert
        assert_eq!(outcome, AiOutcome::Skipped);
        assert!(matches!(result, PostChatResult::Single(ref m) if m.message == "Welcome!"));
    }

    #[tokio::test]
    async fn should_report_missing_form() {
        let state = state(Arc::new(FixtureDataSource::seeded()), None);

        let listed = ChatService::list_messages(&state, 9999, "default").await;
        let posted = ChatService::post_message(&state, 9999, user_message("s1", "hi")).await;

        assert!(matches!(listed, Err(AppError::NotFound(_))));
        assert!(matches!(posted, Err(AppError::NotFound(_))));
    }
}
