use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// AI 답변을 제출 데이터에 병합할 때 사용하는 예약 키
pub const AI_RESPONSE_KEY: &str = "aiResponse";

/// 위젯 방문자의 예/아니오 응답
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_response")]
#[serde(rename_all = "lowercase")]
pub enum UserResponse {
    #[sea_orm(string_value = "yes")]
    Yes,
    #[sea_orm(string_value = "no")]
    No,
}

impl UserResponse {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserResponse::Yes => "yes",
            UserResponse::No => "no",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "form_submission")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub submission_id: i64,
    pub form_id: i64,
    /// 필드 ID를 키로 하는 제출 데이터
    pub data: Json,
    pub ip: String,
    pub user_agent: String,
    pub submitted_at: DateTime,
    pub user_responded: bool,
    pub user_response: Option<UserResponse>,
}

impl Model {
    /// 병합된 AI 답변
    pub fn ai_response(&self) -> Option<&str> {
        self.data.get(AI_RESPONSE_KEY).and_then(|v| v.as_str())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::domain::form::entity::form::Entity",
        from = "Column::FormId",
        to = "crate::domain::form::entity::form::Column::FormId",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Form,
}

impl Related<crate::domain::form::entity::form::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Form.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
