//! Cart route handlers.
//!
//! The cart lives in the visitor's session. Every mutation reads it, applies
//! one [`Cart`] transition and writes it back. The JSON endpoints are called
//! by `static/js/cart.js`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::{Path, State},
};
use oeiras_cloud::served;
use oeiras_core::{Cart, EntityId, LineItem, Price};
use serde::{Deserialize, Deserializer, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::models::session_keys;
use crate::routes::parse_id;
use crate::state::AppState;

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the cart from the session, empty when absent.
///
/// # Errors
///
/// Returns error if the session store fails.
pub async fn load_cart(session: &Session) -> std::result::Result<Cart, tower_sessions::session::Error> {
    Ok(session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default())
}

async fn save_cart(
    session: &Session,
    cart: &Cart,
) -> std::result::Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

/// Item count for the header badge. Session failures count as an empty cart.
pub async fn cart_item_count(session: &Session) -> u64 {
    match load_cart(session).await {
        Ok(cart) => cart.item_count(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read cart from session");
            0
        }
    }
}

// =============================================================================
// Request / Response Bodies
// =============================================================================

/// Accept ids and quantities sent either as JSON numbers or strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Int(i64),
    Text(String),
}

fn loose_id<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<EntityId, D::Error> {
    Ok(match Loose::deserialize(deserializer)? {
        Loose::Int(n) => EntityId::Seq(n),
        Loose::Text(s) => parse_id(&s),
    })
}

fn loose_int<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
    match Loose::deserialize(deserializer)? {
        Loose::Int(n) => Ok(n),
        Loose::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn loose_opt_int<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<i64>, D::Error> {
    loose_int(deserializer).map(Some)
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    #[serde(deserialize_with = "loose_id")]
    pub product_id: EntityId,
    #[serde(default, deserialize_with = "loose_opt_int")]
    pub quantity: Option<i64>,
}

/// Update quantity request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartRequest {
    #[serde(deserialize_with = "loose_id")]
    pub product_id: EntityId,
    #[serde(deserialize_with = "loose_int")]
    pub quantity: i64,
}

/// Response for cart mutations.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub cart_item_count: u64,
    pub cart_total: Price,
}

impl CartResponse {
    fn of(cart: &Cart) -> Self {
        Self {
            success: true,
            message: None,
            cart_item_count: cart.item_count(),
            cart_total: cart.total(),
        }
    }
}

/// Full cart snapshot for `GET /cart/data`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartDataResponse {
    pub cart: Vec<LineItem>,
    pub cart_item_count: u64,
    pub cart_total: Price,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartTemplate {
    pub items: Vec<LineItem>,
    pub total: Price,
    pub cart_item_count: u64,
}

/// Checkout placeholder template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub items: Vec<LineItem>,
    pub total: Price,
    pub cart_item_count: u64,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<CartTemplate> {
    let cart = load_cart(&session).await?;
    Ok(CartTemplate {
        total: cart.total(),
        cart_item_count: cart.item_count(),
        items: cart.items().to_vec(),
    })
}

/// Add a product to the cart.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartResponse>> {
    // Negative or oversized quantities are rejected by the cart as zero
    let quantity = u32::try_from(request.quantity.unwrap_or(1)).unwrap_or(0);
    let product = served(state.products().get_by_id(&request.product_id).await);

    let mut cart = load_cart(&session).await?;
    cart.add(&request.product_id, product.as_ref(), quantity)?;
    save_cart(&session, &cart).await?;

    let id = request.product_id.to_string();
    add_breadcrumb("cart", "Added item", Some(&[("product_id", id.as_str())]));

    Ok(Json(CartResponse {
        message: Some("Item added to cart"),
        ..CartResponse::of(&cart)
    }))
}

/// Set the quantity of a line; zero or less removes it.
#[instrument(skip(session))]
pub async fn update(
    session: Session,
    Json(request): Json<UpdateCartRequest>,
) -> Result<Json<CartResponse>> {
    let mut cart = load_cart(&session).await?;
    cart.update_quantity(&request.product_id, request.quantity)?;
    save_cart(&session, &cart).await?;
    Ok(Json(CartResponse::of(&cart)))
}

/// Remove a line. Removing an absent product still succeeds.
#[instrument(skip(session))]
pub async fn remove(session: Session, Path(id): Path<String>) -> Result<Json<CartResponse>> {
    let product_id = parse_id(&id);
    let mut cart = load_cart(&session).await?;
    if cart.remove(&product_id) {
        save_cart(&session, &cart).await?;
    }
    Ok(Json(CartResponse::of(&cart)))
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Json<CartResponse>> {
    let mut cart = load_cart(&session).await?;
    cart.clear();
    save_cart(&session, &cart).await?;
    Ok(Json(CartResponse::of(&cart)))
}

/// Current cart as JSON.
#[instrument(skip(session))]
pub async fn data(session: Session) -> Result<Json<CartDataResponse>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartDataResponse {
        cart_item_count: cart.item_count(),
        cart_total: cart.total(),
        cart: cart.items().to_vec(),
    }))
}

/// Checkout placeholder: summary plus how to complete the order.
#[instrument(skip(session))]
pub async fn checkout(session: Session) -> Result<CheckoutTemplate> {
    let cart = load_cart(&session).await?;
    Ok(CheckoutTemplate {
        total: cart.total(),
        cart_item_count: cart.item_count(),
        items: cart.items().to_vec(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_add_request_accepts_numbers_and_strings() {
        let numeric: AddToCartRequest =
            serde_json::from_str(r#"{"productId": 7, "quantity": 2}"#).unwrap();
        assert_eq!(numeric.product_id, EntityId::Seq(7));
        assert_eq!(numeric.quantity, Some(2));

        let textual: AddToCartRequest =
            serde_json::from_str(r#"{"productId": "7", "quantity": "3"}"#).unwrap();
        assert_eq!(textual.product_id, EntityId::Seq(7));
        assert_eq!(textual.quantity, Some(3));

        let defaulted: AddToCartRequest = serde_json::from_str(r#"{"productId": 7}"#).unwrap();
        assert_eq!(defaulted.quantity, None);
    }

    #[test]
    fn test_update_request_rejects_garbage_quantity() {
        let result: std::result::Result<UpdateCartRequest, _> =
            serde_json::from_str(r#"{"productId": 7, "quantity": "lots"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_cart_response() {
        let body = serde_json::to_value(CartResponse::of(&Cart::new())).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["cartItemCount"], 0);
        assert!(body.get("message").is_none());
    }
}
