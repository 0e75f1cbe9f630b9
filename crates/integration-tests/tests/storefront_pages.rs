//! Public storefront pages.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use oeiras_cloud::Backends;
use oeiras_core::AboutContent;
use oeiras_integration_tests::{
    RecordingMailer, StorefrontHarness, body_text, product, seed_product, storefront,
};

async fn shop(backends: Backends, mailer: RecordingMailer) -> StorefrontHarness {
    let shop = storefront(backends, mailer);
    seed_product(&shop.state, 1, product("Stoneware Bowl", 2599, Some("Tableware"))).await;
    seed_product(&shop.state, 2, product("Tall Vase", 4000, Some("Decor"))).await;
    seed_product(&shop.state, 3, product("Espresso Cup", 1500, Some("Tableware"))).await;
    seed_product(&shop.state, 4, product("Wall Tile", 900, None)).await;
    shop
}

#[tokio::test]
async fn test_home_shows_first_three_pieces() {
    let mut shop = shop(Backends::in_memory(), RecordingMailer::new()).await;
    let response = shop.client.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Stoneware Bowl"));
    assert!(html.contains("Tall Vase"));
    assert!(html.contains("Espresso Cup"));
    assert!(!html.contains("Wall Tile"));
}

#[tokio::test]
async fn test_products_filter_by_category() {
    let mut shop = shop(Backends::in_memory(), RecordingMailer::new()).await;

    let all = body_text(shop.client.get("/products").await).await;
    assert!(all.contains("Wall Tile"));
    assert!(all.contains("Tall Vase"));

    let tableware = body_text(shop.client.get("/products?category=tableware").await).await;
    assert!(tableware.contains("Stoneware Bowl"));
    assert!(tableware.contains("Espresso Cup"));
    assert!(!tableware.contains("Wall Tile"));
    assert!(!tableware.contains("<h3>Tall Vase</h3>"));
}

#[tokio::test]
async fn test_product_detail_and_missing_product() {
    let mut shop = shop(Backends::in_memory(), RecordingMailer::new()).await;

    let response = shop.client.get("/product/2").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Tall Vase"));

    assert_eq!(
        shop.client.get("/product/999").await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        shop.client.get("/no-such-page").await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_catalog_served_from_fallback_when_primary_down() {
    let mut shop = shop(Backends::offline(), RecordingMailer::new()).await;

    let html = body_text(shop.client.get("/products").await).await;
    assert!(html.contains("Stoneware Bowl"));

    assert_eq!(shop.client.get("/health").await.status(), StatusCode::OK);
    assert_eq!(
        shop.client.get("/health/ready").await.status(),
        StatusCode::SERVICE_UNAVAILABLE
    );
}

#[tokio::test]
async fn test_readiness_with_primary_up() {
    let mut shop = shop(Backends::in_memory(), RecordingMailer::new()).await;
    assert_eq!(
        shop.client.get("/health/ready").await.status(),
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_about_renders_defaults_without_stored_copy() {
    let mut shop = shop(Backends::offline(), RecordingMailer::new()).await;
    let response = shop.client.get("/about").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        body_text(response)
            .await
            .contains(&AboutContent::default().hero_title)
    );
}

#[tokio::test]
async fn test_contact_sends_owner_email() {
    let mut shop = shop(Backends::in_memory(), RecordingMailer::new()).await;
    let response = shop
        .client
        .post_form(
            "/contact",
            "name=Ana+Silva&email=ana%40example.pt&message=Do+you+ship+to+Porto%3F",
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Thank you for your message!"));

    let sent = shop.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].reply_to.as_deref(), Some("ana@example.pt"));
    assert_eq!(sent[0].subject, "New Contact Form Message from Ana Silva");
    assert!(sent[0].text_body.contains("Do you ship to Porto?"));
}

#[tokio::test]
async fn test_contact_validation_keeps_form() {
    let mut shop = shop(Backends::in_memory(), RecordingMailer::new()).await;

    let html = body_text(
        shop.client
            .post_form("/contact", "name=Ana&email=&message=Hello")
            .await,
    )
    .await;
    assert!(html.contains("All fields are required"));

    let html = body_text(
        shop.client
            .post_form("/contact", "name=Ana&email=not-an-address&message=Hello")
            .await,
    )
    .await;
    assert!(html.contains("Please enter a valid email address."));
    assert!(shop.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_contact_transport_failure_still_thanks_visitor() {
    let mut shop = shop(Backends::in_memory(), RecordingMailer::failing()).await;
    let response = shop
        .client
        .post_form("/contact", "name=Ana&email=ana%40example.pt&message=Hello")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        body_text(response)
            .await
            .contains("Our reply may be delayed.")
    );
}
