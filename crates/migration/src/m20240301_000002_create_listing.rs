use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // category_id carries no foreign key: deleting a category must not
        // cascade into listings, and dangling references stay readable.
        manager
            .create_table(
                Table::create()
                    .table(Listing::Table)
                    .if_not_exists()
                    .col(uuid(Listing::Id).primary_key())
                    .col(uuid(Listing::OwnerId).not_null())
                    .col(string_len(Listing::Title, 256).not_null())
                    .col(text(Listing::Description).not_null())
                    .col(double(Listing::Price).not_null())
                    .col(uuid(Listing::CategoryId).not_null())
                    .col(string_len(Listing::Location, 256).not_null())
                    .col(json_binary(Listing::Images).not_null())
                    .col(string_len(Listing::ContactNumber, 32).not_null())
                    .col(string_len(Listing::ContactEmail, 256).not_null())
                    .col(boolean(Listing::IsActive).not_null())
                    .col(timestamp_with_time_zone(Listing::ExpiresAt).not_null())
                    .col(timestamp_with_time_zone(Listing::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Listing::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Listing::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Listing {
    Table,
    Id,
    OwnerId,
    Title,
    Description,
    Price,
    CategoryId,
    Location,
    Images,
    ContactNumber,
    ContactEmail,
    IsActive,
    ExpiresAt,
    CreatedAt,
    UpdatedAt,
}
