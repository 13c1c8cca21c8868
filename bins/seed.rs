//! One-shot seeder for the default category set.
//!
//! Connects with DATABASE_URL, runs migrations and inserts the starter
//! categories, skipping names that already exist.

use dotenvy::dotenv;
use migration::MigratorTrait;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use tracing::{info, warn};

const DEFAULT_CATEGORIES: &[&str] = &[
    "Web Development",
    "Mobile Development",
    "UI/UX Design",
    "Data Science",
    "Digital Marketing",
    "Programming Languages",
    "Game Development",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    common::utils::logging::init_logging_default();

    let db = models::db::connect().await?;
    migration::Migrator::up(&db, None).await?;

    let mut created = 0;
    for name in DEFAULT_CATEGORIES {
        let existing = models::category::Entity::find()
            .filter(models::category::Column::Name.eq(*name))
            .one(&db)
            .await?;
        if existing.is_some() {
            warn!(name, "category already present, skipping");
            continue;
        }
        models::category::create(&db, name, None).await?;
        created += 1;
        info!(name, "seeded category");
    }

    info!(created, total = DEFAULT_CATEGORIES.len(), "category seed complete");
    Ok(())
}
