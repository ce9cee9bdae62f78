use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One uploaded blob. Both digests are stored as lowercase hex.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stored_files")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// SHA-256 of the raw bytes
    #[sea_orm(unique)]
    pub content_digest: String,
    /// XXH3-128 of `content_digest`, used as the on-disk file name
    #[sea_orm(unique)]
    pub name_digest: String,
    pub extension: String,
    pub created_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
