use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // User: email is the login identity, insert relies on this to reject duplicates
        manager
            .create_index(
                Index::create()
                    .name("uniq_user_email")
                    .table(User::Table)
                    .col(User::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // App: names are unique so seeding by name stays unambiguous
        manager
            .create_index(
                Index::create()
                    .name("uniq_app_name")
                    .table(App::Table)
                    .col(App::Name)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("uniq_user_email").table(User::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_app_name").table(App::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum User { Table, Email }

#[derive(DeriveIden)]
enum App { Table, Name }
