use chrono::NaiveDateTime;
use serde::Serialize;
use utoipa::ToSchema;

use crate::store::{AnalyticsSnapshot, FormSubmissionCount, RecentSubmission};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsStats {
    pub total_forms: u64,
    pub total_submissions: u64,
    /// AI 답변이 붙은 제출 + AI 채팅 메시지
    pub ai_interactions: u64,
    /// 예/아니오 응답이 기록된 제출
    pub user_responses: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentSubmissionItem {
    pub title: String,
    pub created_at: NaiveDateTime,
    pub has_ai_response: bool,
}

impl From<RecentSubmission> for RecentSubmissionItem {
    fn from(recent: RecentSubmission) -> Self {
        Self {
            title: recent.form_title,
            created_at: recent.submitted_at,
            has_ai_response: recent.has_ai_response,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopFormItem {
    pub title: String,
    pub submission_count: u64,
}

impl From<FormSubmissionCount> for TopFormItem {
    fn from(count: FormSubmissionCount) -> Self {
        Self {
            title: count.title,
            submission_count: count.submissions,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub stats: AnalyticsStats,
    pub recent_submissions: Vec<RecentSubmissionItem>,
    pub top_forms: Vec<TopFormItem>,
}

impl From<AnalyticsSnapshot> for AnalyticsResponse {
    fn from(snapshot: AnalyticsSnapshot) -> Self {
        Self {
            stats: AnalyticsStats {
                total_forms: snapshot.total_forms,
                total_submissions: snapshot.total_submissions,
                ai_interactions: snapshot.ai_interactions,
                user_responses: snapshot.user_responses,
            },
            recent_submissions: snapshot
                .recent_submissions
                .into_iter()
                .map(RecentSubmissionItem::from)
                .collect(),
            top_forms: snapshot.top_forms.into_iter().map(TopFormItem::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessAnalyticsResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: AnalyticsResponse,
}
