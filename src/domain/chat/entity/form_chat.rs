use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 메시지 발신자
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "chat_sender")]
#[serde(rename_all = "lowercase")]
pub enum ChatSender {
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "ai")]
    Ai,
}

/// 폼 채팅 메시지 (추가 전용)
///
/// `(form_id, session_id)` 쌍이 하나의 세션이며 별도의 세션 레코드는 없습니다.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "form_chat")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub chat_id: i64,
    pub form_id: i64,
    /// 클라이언트가 생성한 세션 식별자
    pub session_id: String,
    pub sender: ChatSender,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    /// 같은 초에 저장된 사용자/AI 메시지도 구분되도록 마이크로초까지 저장
    #[sea_orm(column_type = "custom(\"DATETIME(6)\")")]
    pub created_at: DateTime,
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
