//! Admin area: the session gate, catalog management and the about editor.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use oeiras_cloud::{Backends, served};
use oeiras_core::EntityId;
use oeiras_integration_tests::{
    ADMIN_PASSWORD, RecordingMailer, StorefrontHarness, body_json, body_text, client::Multipart,
    location, product, seed_product, storefront,
};

const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

async fn signed_in(backends: Backends) -> StorefrontHarness {
    let mut shop = storefront(backends, RecordingMailer::new());
    seed_product(&shop.state, 1, product("Stoneware Bowl", 2599, Some("Tableware"))).await;

    let response = shop
        .client
        .post_form(
            "/admin/login",
            &format!("username=admin&password={ADMIN_PASSWORD}"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/admin/dashboard"));
    shop
}

fn product_form(name: &str, price: &str) -> Multipart {
    Multipart::new()
        .text("name", name)
        .text("price", price)
        .text("description", "Wheel-thrown stoneware")
        .text("productDetails", "Dishwasher safe")
        .text("category", "Tableware")
}

#[tokio::test]
async fn test_admin_pages_redirect_to_login() {
    let mut shop = storefront(Backends::in_memory(), RecordingMailer::new());

    for path in ["/admin/dashboard", "/admin/products/add", "/admin/about/edit", "/dashboard"] {
        let response = shop.client.get(path).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&response), Some("/admin/login"), "{path}");
    }

    let response = shop.client.delete("/admin/products/1").await;
    assert_eq!(location(&response), Some("/admin/login"));

    let response = shop.client.get("/admin/login").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_rejections_render_reason() {
    let mut shop = storefront(Backends::in_memory(), RecordingMailer::new());

    let html = body_text(
        shop.client
            .post_form("/admin/login", "username=admin&password=wrong")
            .await,
    )
    .await;
    assert!(html.contains("Incorrect username or password."));

    let html = body_text(
        shop.client
            .post_form(
                "/admin/login",
                &format!("username=visitor&password={ADMIN_PASSWORD}"),
            )
            .await,
    )
    .await;
    assert!(html.contains("Access denied. Admin privileges required."));

    let html = body_text(
        shop.client
            .post_form("/admin/login", "username=+++&password=x")
            .await,
    )
    .await;
    assert!(html.contains("Invalid input format"));

    let response = shop.client.get("/admin/dashboard").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_dashboard_lists_catalog() {
    let mut shop = signed_in(Backends::in_memory()).await;

    let response = shop.client.get("/admin/dashboard").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Stoneware Bowl"));
    assert!(html.contains("admin"));
    assert!(!html.contains("primary database is unreachable"));

    let response = shop.client.get("/admin/login").await;
    assert_eq!(location(&response), Some("/admin/dashboard"));
}

#[tokio::test]
async fn test_dashboard_warns_when_degraded() {
    let mut shop = signed_in(Backends::offline()).await;
    let html = body_text(shop.client.get("/admin/dashboard").await).await;
    assert!(html.contains("primary database is unreachable"));
    assert!(html.contains("Stoneware Bowl"));
}

#[tokio::test]
async fn test_logout_closes_admin_session() {
    let mut shop = signed_in(Backends::in_memory()).await;

    let response = shop.client.post_form("/admin/logout", "").await;
    assert_eq!(location(&response), Some("/admin/login"));

    let response = shop.client.get("/admin/dashboard").await;
    assert_eq!(location(&response), Some("/admin/login"));
}

#[tokio::test]
async fn test_create_product_with_images() {
    let mut shop = signed_in(Backends::in_memory()).await;

    let form = product_form("Speckled Mug", "18.50")
        .file("imageFiles", "mug.jpg", "image/jpeg", JPEG)
        .file("imageFiles", "mug-side.png", "image/png", b"\x89PNG\r\n");
    let response = shop.client.post_multipart("/admin/products", form).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    let created = &body["product"];
    assert_eq!(created["name"], "Speckled Mug");
    assert_eq!(created["price"], "18.50");
    let images = created["images"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(created["image"], images[0]);
    let url = images[0].as_str().unwrap();
    assert!(url.starts_with("/uploads/imageFile-"));
    assert!(url.ends_with(".jpg"));

    let stored = url.trim_start_matches("/uploads/");
    assert!(shop.uploads.path().join(stored).exists());

    let id = created["id"].to_string();
    let page = body_text(shop.client.get(&format!("/product/{id}")).await).await;
    assert!(page.contains("Speckled Mug"));
}

#[tokio::test]
async fn test_create_product_rejections() {
    let mut shop = signed_in(Backends::in_memory()).await;

    let response = shop
        .client
        .post_multipart("/admin/products", product_form("Speckled Mug", "18.50"))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "At least one image is required");

    let form = product_form("Speckled Mug", "free").file("imageFiles", "mug.jpg", "image/jpeg", JPEG);
    let response = shop.client.post_multipart("/admin/products", form).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Price must be a valid positive number"
    );

    let form = product_form("", "18.50").file("imageFiles", "mug.jpg", "image/jpeg", JPEG);
    let response = shop.client.post_multipart("/admin/products", form).await;
    assert_eq!(body_json(response).await["error"], "All fields are required");

    let form = product_form("Speckled Mug", "18.50").file(
        "imageFiles",
        "mug.exe",
        "application/octet-stream",
        b"MZ",
    );
    let response = shop.client.post_multipart("/admin/products", form).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let all = served(shop.state.products().get_all().await);
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_edit_product_keeps_images_without_new_files() {
    let mut shop = signed_in(Backends::in_memory()).await;

    let response = shop.client.get("/admin/products/1/edit").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Stoneware Bowl"));

    let response = shop
        .client
        .post_multipart("/admin/products/1", product_form("Glazed Bowl", "31"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Product updated."));

    let record = served(shop.state.products().get_by_id(&EntityId::Seq(1)).await).unwrap();
    assert_eq!(record.fields.name, "Glazed Bowl");
    assert_eq!(record.fields.image, "/uploads/stoneware-bowl.jpg");
    assert_eq!(record.fields.price.to_string(), "€31.00");
}

#[tokio::test]
async fn test_edit_product_rejection_rerenders_form() {
    let mut shop = signed_in(Backends::in_memory()).await;

    let html = body_text(
        shop.client
            .post_multipart("/admin/products/1", product_form("Glazed Bowl", "-4"))
            .await,
    )
    .await;
    assert!(html.contains("Price must be a valid positive number"));
    assert!(html.contains("Glazed Bowl"));

    let record = served(shop.state.products().get_by_id(&EntityId::Seq(1)).await).unwrap();
    assert_eq!(record.fields.name, "Stoneware Bowl");
}

#[tokio::test]
async fn test_edit_missing_product_is_not_found() {
    let mut shop = signed_in(Backends::in_memory()).await;
    assert_eq!(
        shop.client.get("/admin/products/77/edit").await.status(),
        StatusCode::NOT_FOUND
    );
    let response = shop
        .client
        .post_multipart("/admin/products/77", product_form("Ghost", "1"))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_product() {
    let mut shop = signed_in(Backends::in_memory()).await;

    let response = shop.client.delete("/admin/products/1").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);
    assert_eq!(
        shop.client.get("/product/1").await.status(),
        StatusCode::NOT_FOUND
    );

    let response = shop.client.delete("/admin/products/1").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);

    let response = shop.client.delete("/admin/products/999").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);
}

#[tokio::test]
async fn test_about_editor_updates_page() {
    let mut shop = signed_in(Backends::in_memory()).await;

    let response = shop.client.get("/admin/about/edit").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("About Our Ceramics"));

    let html = body_text(
        shop.client
            .post_form("/admin/about/update", "heroTitle=Made+in+Oeiras")
            .await,
    )
    .await;
    assert!(html.contains("About page updated."));

    let about = body_text(shop.client.get("/about").await).await;
    assert!(about.contains("Made in Oeiras"));
    assert!(about.contains("Our Philosophy"));
}

#[tokio::test]
async fn test_about_editor_rejects_blank_field() {
    let mut shop = signed_in(Backends::in_memory()).await;

    let html = body_text(
        shop.client
            .post_form("/admin/about/update", "heroTitle=Made+in+Oeiras&qualityTitle=")
            .await,
    )
    .await;
    assert!(html.contains("All fields are required"));

    let about = body_text(shop.client.get("/about").await).await;
    assert!(about.contains("About Our Ceramics"));
}

#[tokio::test]
async fn test_about_edit_survives_primary_outage() {
    let mut shop = signed_in(Backends::offline()).await;

    let html = body_text(
        shop.client
            .post_form("/admin/about/update", "heroTitle=Studio+Notes")
            .await,
    )
    .await;
    assert!(html.contains("About page updated."));

    let about = body_text(shop.client.get("/about").await).await;
    assert!(about.contains("Studio Notes"));
}
