//! Create `app` table holding per-application signing secrets.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(App::Table)
                    .if_not_exists()
                    .col(integer(App::Id).primary_key())
                    .col(string_len(App::Name, 128).not_null())
                    .col(string_len(App::Secret, 255).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(App::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub(crate) enum App { Table, Id, Name, Secret }
