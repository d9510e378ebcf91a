use sea_orm::entity::prelude::*;

/// One generation of a definitions document. `update_type` is `hash` or `pattern`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "definition_updates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_type = "String(StringLen::N(16))")]
    pub version: String,
    pub update_type: String,
    pub signature_count: i64,
    #[sea_orm(column_type = "JsonBinary")]
    pub document: Json,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
