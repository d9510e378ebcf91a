use sea_orm::entity::prelude::*;

/// Virus signature. `signature_type` is `hash` or `pattern`; hash rows carry
/// `hash_value`, pattern rows carry `signature_id` + `pattern_data`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "virus_signatures")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub signature_type: String,
    #[sea_orm(unique)]
    pub hash_value: Option<String>,
    #[sea_orm(unique)]
    pub signature_id: Option<String>,
    /// `{"patterns": [...], "logic": "all" | "any"}`
    #[sea_orm(column_type = "JsonBinary")]
    pub pattern_data: Option<Json>,
    pub severity: String,
    pub description: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
