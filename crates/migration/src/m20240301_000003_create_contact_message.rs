use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ContactMessage::Table)
                    .if_not_exists()
                    .col(uuid(ContactMessage::Id).primary_key())
                    .col(string_null(ContactMessage::Name))
                    .col(string_null(ContactMessage::Email))
                    .col(string_len(ContactMessage::Phone, 32).not_null())
                    .col(text_null(ContactMessage::Message))
                    .col(uuid_null(ContactMessage::UserId))
                    .col(timestamp_with_time_zone(ContactMessage::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ContactMessage::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ContactMessage {
    Table,
    Id,
    Name,
    Email,
    Phone,
    Message,
    UserId,
    CreatedAt,
}
