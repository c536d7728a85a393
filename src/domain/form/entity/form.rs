use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "form")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub form_id: i64,
    /// 생성한 사용자의 외부 ID
    pub owner_id: String,
    /// 생성 시점의 소유자 회사
    pub company_id: Option<i64>,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// 게시 여부. 비활성 폼은 임베드 코드로 조회되지 않습니다.
    pub is_active: bool,
    /// 색상/타이포그래피 설정 (JSON)
    pub styling: Option<Json>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::domain::company::entity::company::Entity",
        from = "Column::CompanyId",
        to = "crate::domain::company::entity::company::Column::CompanyId",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Company,
    #[sea_orm(has_many = "super::form_field::Entity")]
    FormField,
    #[sea_orm(has_many = "super::embed::Entity")]
    Embed,
    #[sea_orm(has_one = "super::form_prompt::Entity")]
    FormPrompt,
    #[sea_orm(has_many = "crate::domain::submission::entity::form_submission::Entity")]
    FormSubmission,
    #[sea_orm(has_many = "crate::domain::chat::entity::form_chat::Entity")]
    FormChat,
}

impl Related<crate::domain::company::entity::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<super::form_field::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FormField.def()
    }
}

impl Related<super::embed::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Embed.def()
    }
}

impl Related<super::form_prompt::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FormPrompt.def()
    }
}

impl Related<crate::domain::submission::entity::form_submission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FormSubmission.def()
    }
}

impl Related<crate::domain::chat::entity::form_chat::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FormChat.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
