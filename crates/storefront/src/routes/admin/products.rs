//! Catalog management.
//!
//! Create and edit take `multipart/form-data` with text fields `name`,
//! `price`, `description`, `productDetails`, `category` and up to ten
//! `imageFiles`. Create answers JSON for `static/js/admin.js`; edit
//! re-renders the edit page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::{Multipart, Path, State},
    response::{IntoResponse, Response},
};
use oeiras_cloud::{StorageError, StoreError, UploadedFile, served};
use oeiras_core::{EntityId, Price, Product, Record};
use serde::Serialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::routes::pages::not_found_page;
use crate::routes::parse_id;
use crate::state::AppState;

const FIELDS_REQUIRED: &str = "All fields are required";
const PRICE_INVALID: &str = "Price must be a valid positive number";
const IMAGE_REQUIRED: &str = "At least one image is required";

/// Parsed product form.
#[derive(Debug, Default)]
pub struct ProductSubmission {
    pub name: String,
    pub price: String,
    pub description: String,
    pub product_details: String,
    pub category: String,
    pub files: Vec<UploadedFile>,
}

impl ProductSubmission {
    /// Read every multipart field. Empty file inputs are skipped.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if the body is not valid multipart.
    pub async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut submission = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "imageFiles" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                submission.files.push(UploadedFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
                continue;
            }

            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            match name.as_str() {
                "name" => submission.name = text,
                "price" => submission.price = text,
                "description" => submission.description = text,
                "productDetails" => submission.product_details = text,
                "category" => submission.category = text,
                _ => tracing::debug!(field = %name, "Ignoring unknown product form field"),
            }
        }

        Ok(submission)
    }

    /// Required fields present and price positive.
    fn check(&self) -> std::result::Result<Price, &'static str> {
        if [&self.name, &self.price, &self.description]
            .iter()
            .any(|v| v.trim().is_empty())
        {
            return Err(FIELDS_REQUIRED);
        }
        Price::parse(&self.price).map_err(|_| PRICE_INVALID)
    }

    /// Build the product with `images`; the first becomes the primary image.
    fn into_product(self, price: Price, images: Vec<String>) -> Product {
        let category = self.category.trim();
        Product {
            name: self.name.trim().to_string(),
            price,
            image: images.first().cloned().unwrap_or_default(),
            images,
            description: self.description.trim().to_string(),
            product_details: self.product_details.trim().to_string(),
            category: (!category.is_empty()).then(|| category.to_string()),
        }
    }
}

/// Edit form values, from a stored record or a rejected submission.
#[derive(Debug, Clone)]
pub struct ProductFormView {
    pub id: String,
    pub name: String,
    pub price: String,
    pub description: String,
    pub product_details: String,
    pub category: String,
    pub images: Vec<String>,
}

impl ProductFormView {
    fn from_record(record: &Record<Product>) -> Self {
        let product = &record.fields;
        Self {
            id: record.id.to_string(),
            name: product.name.clone(),
            price: product.price.amount().to_string(),
            description: product.description.clone(),
            product_details: product.product_details.clone(),
            category: product.category.clone().unwrap_or_default(),
            images: product.gallery().into_iter().map(str::to_string).collect(),
        }
    }

    fn from_submission(id: &EntityId, submission: &ProductSubmission, images: Vec<String>) -> Self {
        Self {
            id: id.to_string(),
            name: submission.name.clone(),
            price: submission.price.clone(),
            description: submission.description.clone(),
            product_details: submission.product_details.clone(),
            category: submission.category.clone(),
            images,
        }
    }
}

/// Add product page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/product_add.html")]
pub struct ProductAddTemplate {
    pub username: String,
}

/// Edit product page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/product_edit.html")]
pub struct ProductEditTemplate {
    pub username: String,
    pub product: ProductFormView,
    pub error: Option<String>,
    pub success: bool,
}

/// Response for a created product.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub success: bool,
    pub product: Record<Product>,
}

/// Response for a deleted product.
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub success: bool,
}

/// Display the add product form.
pub async fn add_page(RequireAdmin(admin): RequireAdmin) -> ProductAddTemplate {
    ProductAddTemplate {
        username: admin.username,
    }
}

/// Create a product from the add form.
#[instrument(skip(state, admin, multipart), fields(username = %admin.username))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    multipart: Multipart,
) -> Result<Json<CreatedResponse>> {
    let submission = ProductSubmission::read(multipart).await?;
    let price = submission
        .check()
        .map_err(|msg| AppError::BadRequest(msg.to_string()))?;
    if submission.files.is_empty() {
        return Err(AppError::BadRequest(IMAGE_REQUIRED.to_string()));
    }

    let images = state.uploader().upload_all(&submission.files).await?;
    let product = submission.into_product(price, images.clone());

    match state.products().create(product).await {
        Ok(record) => {
            tracing::info!(product_id = %record.id, "Product created");
            Ok(Json(CreatedResponse {
                success: true,
                product: record,
            }))
        }
        Err(e) => {
            state.uploader().delete_all(&images).await;
            Err(e.into())
        }
    }
}

/// Display the edit form.
#[instrument(skip(state, admin), fields(username = %admin.username))]
pub async fn edit_page(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Response {
    match served(state.products().get_by_id(&parse_id(&id)).await) {
        Some(record) => ProductEditTemplate {
            username: admin.username,
            product: ProductFormView::from_record(&record),
            error: None,
            success: false,
        }
        .into_response(),
        None => not_found_page(0),
    }
}

/// Save the edit form. Without new files the current images are kept.
#[instrument(skip(state, admin, multipart), fields(username = %admin.username))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Response> {
    let id = parse_id(&id);
    let submission = ProductSubmission::read(multipart).await?;

    let Some(existing) = served(state.products().get_by_id(&id).await) else {
        return Ok(not_found_page(0));
    };
    let current_images: Vec<String> = existing
        .fields
        .gallery()
        .into_iter()
        .map(str::to_string)
        .collect();

    let rejected = |submission: &ProductSubmission, message: &str| {
        ProductEditTemplate {
            username: admin.username.clone(),
            product: ProductFormView::from_submission(&id, submission, current_images.clone()),
            error: Some(message.to_string()),
            success: false,
        }
        .into_response()
    };

    let price = match submission.check() {
        Ok(price) => price,
        Err(message) => return Ok(rejected(&submission, message)),
    };

    let images = if submission.files.is_empty() {
        current_images.clone()
    } else {
        match state.uploader().upload_all(&submission.files).await {
            Ok(urls) => urls,
            Err(StorageError::Invalid(e)) => return Ok(rejected(&submission, &e.to_string())),
            Err(e) => {
                tracing::error!(error = %e, "Image upload failed");
                return Ok(rejected(&submission, "Failed to upload images"));
            }
        }
    };

    let product = submission.into_product(price, images);
    match state.products().update(&id, product).await {
        Ok(record) => {
            tracing::info!(product_id = %record.id, "Product updated");
            Ok(ProductEditTemplate {
                username: admin.username,
                product: ProductFormView::from_record(&record),
                error: None,
                success: true,
            }
            .into_response())
        }
        Err(StoreError::NotFound(_)) => Ok(not_found_page(0)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to update product");
            Ok(ProductEditTemplate {
                username: admin.username,
                product: ProductFormView::from_record(&existing),
                error: Some("Failed to update product".to_string()),
                success: false,
            }
            .into_response())
        }
    }
}

/// Delete a product and, best-effort, its images.
#[instrument(skip(state, admin), fields(username = %admin.username))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>> {
    let id = parse_id(&id);
    let images: Vec<String> = served(state.products().get_by_id(&id).await)
        .map(|record| {
            record
                .fields
                .gallery()
                .into_iter()
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if state.products().delete(&id).await? {
        tracing::info!(product_id = %id, "Product deleted");
        state.uploader().delete_all(&images).await;
    } else {
        tracing::debug!(product_id = %id, "Product already absent");
    }
    Ok(Json(DeletedResponse { success: true }))
}
