use crate::db::connect;
use crate::{address, product, service_offering, user};
use anyhow::Result;
use migration::MigratorTrait;
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait};
use uuid::Uuid;

/// Setup test database with migrations
async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = connect().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::test]
async fn test_user_crud() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }

    let db = setup_test_db().await?;

    let email = format!("test_{}@example.com", Uuid::new_v4());
    let created = user::create(&db, &email, "Test Customer", None, user::ROLE_CUSTOMER).await?;
    assert_eq!(created.email, email);
    assert_eq!(created.role, user::ROLE_CUSTOMER);
    assert_eq!(created.status, "active");

    let found = user::Entity::find_by_id(created.id).one(&db).await?;
    assert!(found.is_some());
    assert_eq!(found.unwrap().email, email);

    user::soft_delete(&db, created.id).await?;
    let soft_deleted = user::Entity::find_by_id(created.id).one(&db).await?.unwrap();
    assert!(soft_deleted.deleted_at.is_some());

    user::hard_delete(&db, created.id).await?;
    let gone = user::Entity::find_by_id(created.id).one(&db).await?;
    assert!(gone.is_none());

    Ok(())
}

#[tokio::test]
async fn test_user_validation() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }

    let db = setup_test_db().await?;

    let bad_email = user::create(&db, "not-an-email", "Name", None, user::ROLE_CUSTOMER).await;
    assert!(bad_email.is_err());

    let bad_role = user::create(&db, "ok@example.com", "Name", None, "superuser").await;
    assert!(bad_role.is_err());

    Ok(())
}

#[tokio::test]
async fn test_catalog_crud() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }

    let db = setup_test_db().await?;

    let provider = user::create(
        &db,
        &format!("provider_{}@example.com", Uuid::new_v4()),
        "Provider",
        None,
        user::ROLE_PROVIDER,
    )
    .await?;
    let seller = user::create(
        &db,
        &format!("seller_{}@example.com", Uuid::new_v4()),
        "Seller",
        None,
        user::ROLE_SELLER,
    )
    .await?;

    let svc = service_offering::create(&db, provider.id, "Deep Clean", Some("3 rooms"), Decimal::new(80000, 2), 120).await?;
    assert!(svc.active);
    assert_eq!(svc.price, Decimal::new(80000, 2));

    let negative_price = service_offering::create(&db, provider.id, "Bad", None, Decimal::new(-100, 2), 30).await;
    assert!(negative_price.is_err());

    let prod = product::create(&db, seller.id, "Vacuum", None, Decimal::new(50000, 2), None, 5).await?;
    assert_eq!(prod.stock_quantity, 5);

    service_offering::Entity::delete_by_id(svc.id).exec(&db).await?;
    product::Entity::delete_by_id(prod.id).exec(&db).await?;
    user::hard_delete(&db, provider.id).await?;
    user::hard_delete(&db, seller.id).await?;

    Ok(())
}

#[tokio::test]
async fn test_address_create_and_format() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }

    let db = setup_test_db().await?;

    let customer = user::create(
        &db,
        &format!("customer_{}@example.com", Uuid::new_v4()),
        "Customer",
        None,
        user::ROLE_CUSTOMER,
    )
    .await?;

    let addr = address::create(&db, customer.id, "home", "1 Main St", "Springfield", Some("12345"), None, None, None).await?;
    assert_eq!(address::format_single_line(&addr), "1 Main St, Springfield 12345");

    let missing_line = address::create(&db, customer.id, "home", " ", "Springfield", None, None, None, None).await;
    assert!(missing_line.is_err());

    address::Entity::delete_by_id(addr.id).exec(&db).await?;
    user::hard_delete(&db, customer.id).await?;

    Ok(())
}
