use sea_orm_migration::prelude::*;

use crate::m20260815_000001_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum Statuses {
    Table,
    Id,
    UserId,
    Content,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Statuses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Statuses::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Statuses::UserId).string().not_null())
                    .col(ColumnDef::new(Statuses::Content).string().not_null())
                    .col(
                        ColumnDef::new(Statuses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-statuses-user_id")
                            .from(Statuses::Table, Statuses::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Feed pages scan by author and (created_at, id) descending.
        manager
            .create_index(
                Index::create()
                    .name("idx-statuses-user_id-created_at")
                    .table(Statuses::Table)
                    .col(Statuses::UserId)
                    .col(Statuses::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Statuses::Table).to_owned())
            .await
    }
}
