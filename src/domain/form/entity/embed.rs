use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 폼 임베드 엔티티
///
/// 하나의 폼에 여러 임베드가 있을 수 있지만 첫 번째만 노출합니다.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "embed")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub embed_id: i64,
    pub form_id: i64,
    /// 공개 식별자
    #[sea_orm(unique)]
    pub embed_code: String,
    pub url: String,
    pub created_at: DateTime,
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
