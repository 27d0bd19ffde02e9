use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "app")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub name: String,
    #[serde(skip_serializing)]
    pub secret: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub async fn create(db: &DatabaseConnection, id: i32, name: &str, secret: &str) -> Result<Model, ModelError> {
    if name.trim().is_empty() { return Err(ModelError::Validation("name required".into())); }
    if secret.is_empty() { return Err(ModelError::Validation("secret required".into())); }
    let am = ActiveModel {
        id: Set(id),
        name: Set(name.to_string()),
        secret: Set(secret.to_string()),
    };
    am.insert(db).await.map_err(ModelError::from_db)
}

pub async fn find_by_id(db: &DatabaseConnection, id: i32) -> Result<Option<Model>, ModelError> {
    Entity::find_by_id(id).one(db).await.map_err(ModelError::from_db)
}
