use tracing::debug;

use crate::state::AppState;
use crate::utils::auth::AuthUser;
use crate::utils::error::AppError;

use super::dto::AnalyticsResponse;

/// 최근 제출 개수
pub const RECENT_SUBMISSION_LIMIT: usize = 10;
/// 상위 폼 개수
pub const TOP_FORM_LIMIT: usize = 5;

pub struct AnalyticsService;

impl AnalyticsService {
    /// 호출자 소유 폼 기준 대시보드 집계
    pub async fn dashboard(
        state: &AppState,
        auth: &AuthUser,
    ) -> Result<AnalyticsResponse, AppError> {
        let snapshot = state
            .store
            .analytics(&auth.external_id, RECENT_SUBMISSION_LIMIT, TOP_FORM_LIMIT)
            .await?;

        debug!(
            owner_id = %auth.external_id,
            total_forms = snapshot.total_forms,
            total_submissions = snapshot.total_submissions,
            "Analytics computed"
        );

        Ok(AnalyticsResponse::from(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::config::AppConfig;
    use crate::domain::chat::entity::form_chat::ChatSender;
    use crate::domain::submission::entity::form_submission::UserResponse;
    use crate::storage::MemoryBlobStore;
    use crate::store::fixture::{DEMO_EMBED_CODE, DEMO_EXTERNAL_ID};
    use crate::store::{DataSource, FixtureDataSource, NewChatMessage, NewSubmission};

    #[tokio::test]
    async fn should_count_only_callers_forms() {
        // Arrange
        let store = Arc::new(FixtureDataSource::seeded());
        let form_id = store
            .find_active_form_by_embed_code(DEMO_EMBED_CODE)
            .await
            .unwrap()
            .unwrap()
            .form
            .form_id;
        for data in [json!({ "a": 1 }), json!({ "a": 2, "aiResponse": "Hi" })] {
            store
                .create_submission(NewSubmission {
                    form_id,
                    data,
                    ip: "127.0.0.1".into(),
                    user_agent: "test".into(),
                })
                .await
                .unwrap();
        }
        let first = store.list_submissions(form_id).await.unwrap()[1].submission_id;
        store
            .record_user_response(first, UserResponse::Yes)
            .await
            .unwrap();
        store
            .append_chat_message(NewChatMessage {
                form_id,
                session_id: "s".into(),
                sender: ChatSender::Ai,
                message: "Hello".into(),
            })
            .await
            .unwrap();
        let state = AppState {
            store,
            ai: None,
            blobs: Arc::new(MemoryBlobStore::new("http://localhost:3000")),
            config: AppConfig::for_fixture("test-secret"),
        };
        let owner = AuthUser {
            external_id: DEMO_EXTERNAL_ID.into(),
            user: None,
        };
        let stranger = AuthUser {
            external_id: "someone_else".into(),
            user: None,
        };

        // Act
        let mine = AnalyticsService::dashboard(&state, &owner).await.unwrap();
        let theirs = AnalyticsService::dashboard(&state, &stranger).await.unwrap();

        // Assert
        assert_eq!(mine.stats.total_forms, 1);
        assert_eq!(mine.stats.total_submissions, 2);
        assert_eq!(mine.stats.ai_interactions, 2);
        assert_eq!(mine.stats.user_responses, 1);
        assert_eq!(mine.recent_submissions.len(), 2);
        assert!(mine.recent_submissions[0].has_ai_response);
        assert_eq!(mine.top_forms[0].submission_count, 2);
        assert_eq!(theirs.stats.total_forms, 0);
        assert!(theirs.top_forms.is_empty());
    }
}
