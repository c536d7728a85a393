use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 회사(테넌트) 프로필 엔티티
///
/// 프로필 필드는 AI 프롬프트 컨텍스트로 사용되며,
/// `data_usage`는 업로드/삭제 시 증감되는 사용량 카운터입니다 (MB).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "company")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub company_id: i64,
    #[sea_orm(unique)]
    pub user_id: i64,
    pub name: String,
    pub website: Option<String>,
    pub business_type: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub product_description: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub target_audience: Option<String>,
    pub main_contact_goal: Option<String>,
    pub preferred_tone: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub keywords: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub common_questions: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub value_offers: Option<String>,
    pub follow_up_style: Option<String>,
    /// 사용 중인 저장 용량 (MB)
    pub data_usage: f64,
    /// 허용 저장 용량 (MB)
    pub max_data_allowance: f64,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::domain::user::entity::user::Entity",
        from = "Column::UserId",
        to = "crate::domain::user::entity::user::Column::UserId",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    User,
    #[sea_orm(has_many = "super::company_file::Entity")]
    CompanyFile,
    #[sea_orm(has_many = "crate::domain::form::entity::form::Entity")]
    Form,
}

impl Related<crate::domain::user::entity::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::company_file::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CompanyFile.def()
    }
}

impl Related<crate::domain::form::entity::form::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Form.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
