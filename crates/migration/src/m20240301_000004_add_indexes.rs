use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Category: unique name
        manager
            .create_index(
                Index::create()
                    .name("uniq_category_name")
                    .table(Category::Table)
                    .col(Category::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Listing: owner and category lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_listing_owner")
                    .table(Listing::Table)
                    .col(Listing::OwnerId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_listing_category")
                    .table(Listing::Table)
                    .col(Listing::CategoryId)
                    .to_owned(),
            )
            .await?;

        // Listing: composite (is_active, expires_at) for the expiry sweep
        manager
            .create_index(
                Index::create()
                    .name("idx_listing_active_expires")
                    .table(Listing::Table)
                    .col(Listing::IsActive)
                    .col(Listing::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        // Listing: recency sort
        manager
            .create_index(
                Index::create()
                    .name("idx_listing_created")
                    .table(Listing::Table)
                    .col(Listing::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("uniq_category_name").table(Category::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_listing_owner").table(Listing::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_listing_category").table(Listing::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_listing_active_expires").table(Listing::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_listing_created").table(Listing::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Category {
    Table,
    Name,
}

#[derive(DeriveIden)]
enum Listing {
    Table,
    OwnerId,
    CategoryId,
    IsActive,
    ExpiresAt,
    CreatedAt,
}
