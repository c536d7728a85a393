use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 회사 업로드 파일 엔티티 (소프트 삭제)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "company_file")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub file_id: i64,
    pub company_id: i64,
    pub name: String,
    pub url: String,
    /// 실제 업로드 바이트 수에서 계산한 크기 (MB)
    pub size: f64,
    pub deleted: bool,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::CompanyId",
        to = "super::company::Column::CompanyId",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Company,
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
