use crate::entities::auth_users;
use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;

/// One credential row per (identity, login, provider).
#[derive(DeriveMigrationName)]
pub struct Migration;

const INDEX_NAME: &str = "ux_auth_users_auth_id_login_provider";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name(INDEX_NAME)
                    .table(AuthUsers)
                    .col(auth_users::Column::AuthId)
                    .col(auth_users::Column::Login)
                    .col(auth_users::Column::Provider)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name(INDEX_NAME).table(AuthUsers).to_owned())
            .await
    }
}
