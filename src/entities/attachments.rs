use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "attachments")]
#[schema(as = Attachment)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Generated storage name, unique within the patient directory
    pub filename: String,
    /// Client-supplied display name, preserved verbatim
    pub original_name: String,
    pub mime_type: String,
    pub size: i64,
    /// Filesystem location of the stored bytes
    pub path: String,
    pub patient_id: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::patients::Entity",
        from = "Column::PatientId",
        to = "super::patients::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Patients,
}

impl Related<super::patients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Patients.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
