use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    if email.trim().is_empty() { return Err(ModelError::Validation("email required".into())); }
    Ok(())
}

/// Insert a user and return the store-assigned id.
///
/// A duplicate email is rejected by the unique index and surfaces as `ModelError::Conflict`.
pub async fn create(db: &DatabaseConnection, email: &str, password_hash: &str) -> Result<i64, ModelError> {
    validate_email(email)?;
    if password_hash.trim().is_empty() { return Err(ModelError::Validation("password hash required".into())); }
    let am = ActiveModel {
        email: Set(email.to_string()),
        password_hash: Set(password_hash.to_string()),
        is_admin: Set(false),
        ..Default::default()
    };
    let res = Entity::insert(am).exec(db).await.map_err(ModelError::from_db)?;
    Ok(res.last_insert_id)
}

pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<Model>, ModelError> {
    Entity::find()
        .filter(Column::Email.eq(email))
        .one(db)
        .await
        .map_err(ModelError::from_db)
}

pub async fn find_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<Model>, ModelError> {
    Entity::find_by_id(id).one(db).await.map_err(ModelError::from_db)
}

/// Grant or revoke admin. Used by provisioning; the auth service never mutates users.
pub async fn set_admin(db: &DatabaseConnection, id: i64, is_admin: bool) -> Result<(), ModelError> {
    let mut found: ActiveModel = Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(ModelError::from_db)?
        .ok_or_else(|| ModelError::NotFound(format!("user {id}")))?
        .into();
    found.is_admin = Set(is_admin);
    found.update(db).await.map_err(ModelError::from_db)?;
    Ok(())
}
