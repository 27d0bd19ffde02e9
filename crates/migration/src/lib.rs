//! Migrator registering the auth schema migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

use sea_orm_migration::sea_orm::{ConnectionTrait, DatabaseConnection};

mod m20240101_000001_create_user;
mod m20240101_000002_create_app;
mod m20240101_000003_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_user::Migration),
            Box::new(m20240101_000002_create_app::Migration),
            // Indexes should always be applied last
            Box::new(m20240101_000003_add_indexes::Migration),
        ]
    }
}

/// Result of a migration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Schema was already current.
    NoChange,
    /// Number of migrations applied by this run.
    Applied(usize),
}

/// Names of migrations not yet recorded in the migration table.
pub async fn pending_names(db: &DatabaseConnection) -> Result<Vec<String>, DbErr> {
    let pending = Migrator::get_pending_migrations(db).await?;
    Ok(pending.iter().map(|m| m.name().to_string()).collect())
}

/// Apply every pending migration. Re-running against a current schema is a no-op.
pub async fn apply_pending(db: &DatabaseConnection) -> Result<MigrationOutcome, DbErr> {
    let pending = Migrator::get_pending_migrations(db).await?.len();
    if pending == 0 {
        return Ok(MigrationOutcome::NoChange);
    }
    Migrator::up(db, None).await?;
    Ok(MigrationOutcome::Applied(pending))
}

/// Provision an application row (apps are managed out-of-band, not by the auth service).
pub async fn seed_app(db: &DatabaseConnection, id: i32, name: &str, secret: &str) -> Result<(), DbErr> {
    use m20240101_000002_create_app::App;

    if secret.is_empty() {
        return Err(DbErr::Custom("app secret must not be empty".into()));
    }
    let mut insert = Query::insert();
    insert
        .into_table(App::Table)
        .columns([App::Id, App::Name, App::Secret])
        .values([id.into(), name.into(), secret.into()])
        .map_err(|e| DbErr::Custom(e.to_string()))?;
    let stmt = db.get_database_backend().build(&insert);
    db.execute(stmt).await?;
    Ok(())
}
