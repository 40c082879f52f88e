use sea_orm_migration::prelude::*;

use crate::m20220101_000001_create_role_table::Role;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, m: &SchemaManager) -> Result<(), DbErr> {
        m.create_table(
            Table::create()
                .table(User::Table)
                .if_not_exists()
                .col(ColumnDef::new(User::Id).integer().not_null().auto_increment().primary_key())
                .col(ColumnDef::new(User::Confirmed).boolean().not_null().default(false))
                .col(ColumnDef::new(User::FirstName).string_len(64).not_null())
                .col(ColumnDef::new(User::LastName).string_len(64).not_null())
                .col(ColumnDef::new(User::Email).string_len(64).not_null())
                .col(ColumnDef::new(User::PasswordHash).string_len(128).null())
                .col(ColumnDef::new(User::RoleId).integer().null())
                .col(ColumnDef::new(User::CreatedAt).timestamp_with_time_zone().not_null())
                .col(ColumnDef::new(User::UpdatedAt).timestamp_with_time_zone().not_null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_users_role")
                        .from(User::Table, User::RoleId)
                        .to(Role::Table, Role::Id)
                        .on_delete(ForeignKeyAction::SetNull)
                        .on_update(ForeignKeyAction::Cascade),
                )
                .to_owned(),
        ).await?;

        // uniqueness lives in the store, callers rely on the violation
        m.create_index(
            Index::create()
                .name("uk_users_email")
                .table(User::Table)
                .col(User::Email)
                .unique()
                .to_owned(),
        ).await?;

        m.create_index(
            Index::create()
                .name("idx_users_first_name")
                .table(User::Table)
                .col(User::FirstName)
                .to_owned(),
        ).await?;

        m.create_index(
            Index::create()
                .name("idx_users_last_name")
                .table(User::Table)
                .col(User::LastName)
                .to_owned(),
        ).await?;

        Ok(())
    }

    async fn down(&self, m: &SchemaManager) -> Result<(), DbErr> {
        m.alter_table(
            Table::alter()
                .table(User::Table)
                .drop_foreign_key(Alias::new("fk_users_role"))
                .to_owned(),
        ).await?;
        m.drop_table(Table::drop().table(User::Table).if_exists().to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum User {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Confirmed,
    FirstName,
    LastName,
    Email,
    PasswordHash,
    RoleId,
    CreatedAt,
    UpdatedAt,
}
