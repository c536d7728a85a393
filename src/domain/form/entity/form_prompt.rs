use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "form_prompt")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub form_prompt_id: i64,
    #[sea_orm(unique)]
    pub form_id: i64,
    /// AI 지시문
    #[sea_orm(column_type = "Text", nullable)]
    pub prompt: Option<String>,
    /// 자유 형식 컨텍스트
    #[sea_orm(column_type = "Text", nullable)]
    pub context: Option<String>,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::form::Entity",
        from = "Column::FormId",
        to = "super::form::Column::FormId",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Form,
}

impl Related<super::form::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Form.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
