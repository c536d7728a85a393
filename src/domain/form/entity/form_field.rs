use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 폼 필드 타입
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "field_type")]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[sea_orm(string_value = "text")]
    Text,
    #[sea_orm(string_value = "email")]
    Email,
    #[sea_orm(string_value = "textarea")]
    Textarea,
    #[sea_orm(string_value = "select")]
    Select,
    #[sea_orm(string_value = "radio")]
    Radio,
    #[sea_orm(string_value = "checkbox")]
    Checkbox,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "form_field")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub form_field_id: i64,
    pub form_id: i64,
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    /// 선택지 목록을 JSON 문자열로 직렬화한 값
    #[sea_orm(column_type = "Text", nullable)]
    pub options: Option<String>,
    /// 저장 시 배열 위치로 부여되는 순서 (0부터 연속)
    pub order_index: i32,
}

impl Model {
    /// 직렬화된 선택지를 목록으로 복원합니다. 형식이 깨진 값은 빈 목록으로 취급합니다.
    pub fn option_list(&self) -> Vec<String> {
        self.options
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }
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
