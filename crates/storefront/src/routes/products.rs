//! Product route handlers.

use std::collections::BTreeSet;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use oeiras_cloud::served;
use oeiras_core::{Price, Product, Record};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::routes::cart::cart_item_count;
use crate::routes::pages::not_found_page;
use crate::routes::parse_id;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub price: Price,
    pub image: String,
    pub images: Vec<String>,
    pub description: String,
    pub product_details: String,
    pub category: Option<String>,
}

impl From<&Record<Product>> for ProductView {
    fn from(record: &Record<Product>) -> Self {
        let product = &record.fields;
        Self {
            id: record.id.to_string(),
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            images: product.gallery().into_iter().map(str::to_string).collect(),
            description: product.description.clone(),
            product_details: product.product_details.clone(),
            category: product.category.clone(),
        }
    }
}

/// Category filter link.
#[derive(Debug, Clone)]
pub struct CategoryLink {
    pub name: String,
    pub selected: bool,
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub category: Option<String>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products.html")]
pub struct ProductsTemplate {
    pub products: Vec<ProductView>,
    pub categories: Vec<CategoryLink>,
    pub selected_category: Option<String>,
    pub cart_item_count: u64,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "product.html")]
pub struct ProductTemplate {
    pub product: ProductView,
    pub cart_item_count: u64,
}

/// Distinct categories in listing order, marking the selected one.
fn category_links(products: &[Record<Product>], selected: Option<&str>) -> Vec<CategoryLink> {
    let names: BTreeSet<&str> = products
        .iter()
        .filter_map(|p| p.fields.category.as_deref())
        .collect();
    names
        .into_iter()
        .map(|name| CategoryLink {
            name: name.to_string(),
            selected: selected.is_some_and(|s| s.eq_ignore_ascii_case(name)),
        })
        .collect()
}

/// Display product listing page, optionally filtered by category.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ProductsQuery>,
) -> ProductsTemplate {
    let all = served(state.products().get_all().await);
    let selected = query.category.filter(|c| !c.trim().is_empty());

    let products = all
        .iter()
        .filter(|p| selected.as_deref().is_none_or(|c| p.fields.in_category(c)))
        .map(ProductView::from)
        .collect();

    ProductsTemplate {
        products,
        categories: category_links(&all, selected.as_deref()),
        selected_category: selected,
        cart_item_count: cart_item_count(&session).await,
    }
}

/// Display product detail page.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Response {
    let cart_item_count = cart_item_count(&session).await;
    match served(state.products().get_by_id(&parse_id(&id)).await) {
        Some(record) => ProductTemplate {
            product: ProductView::from(&record),
            cart_item_count,
        }
        .into_response(),
        None => not_found_page(cart_item_count),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use oeiras_core::EntityId;

    use super::*;

    fn record(id: i64, name: &str, category: Option<&str>) -> Record<Product> {
        Record::new(
            EntityId::Seq(id),
            Product {
                name: name.to_string(),
                price: Price::from_cents(1000),
                image: format!("/uploads/{id}.jpg"),
                images: vec![],
                description: String::new(),
                product_details: String::new(),
                category: category.map(str::to_string),
            },
        )
    }

    #[test]
    fn test_category_links_are_distinct_and_sorted() {
        let products = vec![
            record(1, "Bowl", Some("Tableware")),
            record(2, "Vase", Some("Decor")),
            record(3, "Plate", Some("Tableware")),
            record(4, "Tile", None),
        ];
        let links = category_links(&products, Some("tableware"));
        let names: Vec<_> = links.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["Decor", "Tableware"]);
        assert!(!links.first().unwrap().selected);
        assert!(links.last().unwrap().selected);
    }

    #[test]
    fn test_view_falls_back_to_primary_image() {
        let view = ProductView::from(&record(5, "Cup", None));
        assert_eq!(view.id, "5");
        assert_eq!(view.images, ["/uploads/5.jpg"]);
    }
}
