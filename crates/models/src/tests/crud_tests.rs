use crate::db::connect;
use crate::{category, contact_message, listing};
use sea_orm::{DatabaseConnection, EntityTrait, ActiveModelTrait, Set, QueryFilter, ColumnTrait};
use anyhow::Result;
use migration::MigratorTrait;
use uuid::Uuid;
use chrono::{Duration, Utc};

/// Setup test database with migrations
async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = connect().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Test category CRUD operations
#[tokio::test]
async fn test_category_crud() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }

    let db = setup_test_db().await?;

    // Test Create
    let name = format!("test_category_{}", Uuid::new_v4());
    let created = category::create(&db, &name, None).await?;
    assert_eq!(created.name, name);
    assert_eq!(created.logo, None);

    // Test Read
    let found = category::Entity::find_by_id(created.id).one(&db).await?;
    assert!(found.is_some());
    assert_eq!(found.unwrap().name, name);

    // Test find by name
    let by_name = category::Entity::find()
        .filter(category::Column::Name.eq(name.clone()))
        .one(&db)
        .await?;
    assert_eq!(by_name.unwrap().id, created.id);

    // Test Hard Delete
    category::Entity::delete_by_id(created.id).exec(&db).await?;
    let gone = category::Entity::find_by_id(created.id).one(&db).await?;
    assert!(gone.is_none());

    println!("Category CRUD test completed successfully");
    Ok(())
}

/// Test listing row round-trip including the JSON image column
#[tokio::test]
async fn test_listing_crud() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }

    let db = setup_test_db().await?;

    let cat = category::create(&db, &format!("listing_cat_{}", Uuid::new_v4()), None).await?;
    let now = Utc::now();
    let urls = vec!["/uploads/services/a.png".to_string(), "/uploads/services/b.png".to_string()];

    let am = listing::ActiveModel {
        id: Set(Uuid::new_v4()),
        owner_id: Set(Uuid::new_v4()),
        title: Set("Plumbing".into()),
        description: Set("Fix leaks".into()),
        price: Set(75.0),
        category_id: Set(cat.id),
        location: Set("Cairo".into()),
        images: Set(listing::images_to_json(&urls)),
        contact_number: Set("0123456789".into()),
        contact_email: Set("pro@example.com".into()),
        is_active: Set(true),
        expires_at: Set((now + Duration::minutes(10)).into()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };
    let created = am.insert(&db).await?;

    let found = listing::Entity::find_by_id(created.id).one(&db).await?.unwrap();
    assert_eq!(listing::images_from_json(&found.images), urls);
    assert!(found.is_active);
    assert!(found.expires_at >= found.created_at);

    // Cleanup
    listing::Entity::delete_by_id(created.id).exec(&db).await?;
    category::Entity::delete_by_id(cat.id).exec(&db).await?;

    println!("Listing CRUD test completed successfully");
    Ok(())
}

/// Test contact message creation and phone validation boundary
#[tokio::test]
async fn test_contact_message_crud() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }

    let db = setup_test_db().await?;

    let created = contact_message::create(
        &db,
        Some("Alice".into()),
        Some("alice@example.com".into()),
        "0123456789",
        Some("interested in your service".into()),
        None,
    )
    .await?;

    let found = contact_message::Entity::find_by_id(created.id).one(&db).await?;
    assert!(found.is_some());
    assert_eq!(found.unwrap().phone, "0123456789");

    let bad = contact_message::create(&db, None, None, "not-a-phone", None, None).await;
    assert!(bad.is_err());

    contact_message::Entity::delete_by_id(created.id).exec(&db).await?;

    println!("Contact message CRUD test completed successfully");
    Ok(())
}
