use crate::entities::prelude::*;
use crate::entities::{auth_user_log, auth_users};
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(AuthGroups)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(AuthId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Composite primary key (auth_id, group_id) doubles as the membership index.
        manager
            .create_table(
                schema
                    .create_table_from_entity(AuthAuthGroups)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(AuthUsers)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(AuthUserLog)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(AuthProfiles)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        let user_indexes = [
            ("idx_auth_users_auth_id", auth_users::Column::AuthId),
            ("idx_auth_users_login", auth_users::Column::Login),
            ("idx_auth_users_provider", auth_users::Column::Provider),
            ("idx_auth_users_email", auth_users::Column::Email),
        ];
        for (name, column) in user_indexes {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(AuthUsers)
                        .col(column)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        let log_indexes = [
            ("idx_auth_user_log_auth_id", auth_user_log::Column::AuthId),
            ("idx_auth_user_log_user_id", auth_user_log::Column::UserId),
        ];
        for (name, column) in log_indexes {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(AuthUserLog)
                        .col(column)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuthProfiles).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuthUserLog).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuthUsers).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuthAuthGroups).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuthId).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuthGroups).if_exists().to_owned())
            .await?;

        Ok(())
    }
}
