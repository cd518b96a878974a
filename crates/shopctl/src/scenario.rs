//! The walkthrough the binary runs against whichever store is configured.

use common::ProductId;
use document_store::DocumentStore;
use serde_json::json;
use shop::collections::PRODUCTS;
use shop::{Order, Product, Result, ShopConfig, User, Users};

/// Registers a user, fills and edits their cart, converts it and prints the
/// user's orders as JSON. Returns the orders that were listed.
pub async fn run<S>(store: S, config: &ShopConfig) -> Result<Vec<Order>>
where
    S: DocumentStore + Clone,
{
    let (notebook, lamp) = seed_catalog(&store).await?;
    let users = Users::from_config(store, config);

    let mut user = users
        .register(User::new("Ada Lovelace", "ada@example.com"))
        .await?;
    tracing::info!(user_id = %user.id(), "user registered");

    user.add_one(&notebook).await?;
    user.add_one(&notebook).await?;
    user.add_one(&lamp).await?;
    user.remove_line(notebook.id()).await?;

    let resolved = user.resolve_cart().await?;
    for line in resolved.lines() {
        tracing::info!(
            product_id = %line.product_id(),
            quantity = line.quantity(),
            "cart line"
        );
    }

    let order = user.convert_cart_to_order().await?;
    tracing::info!(order_id = %order.id(), items = order.items().len(), "cart converted");

    let orders = user.list_orders().await?;
    for order in &orders {
        println!("{}", serde_json::to_string_pretty(order)?);
    }

    Ok(orders)
}

async fn seed_catalog<S: DocumentStore>(store: &S) -> Result<(Product, Product)> {
    let notebook = Product::new(ProductId::new())
        .with_field("title", json!("Notebook"))
        .with_field("price", json!(4.5));
    let lamp = Product::new(ProductId::new())
        .with_field("title", json!("Desk lamp"))
        .with_field("price", json!(29.0));

    for product in [&notebook, &lamp] {
        store.insert_one(PRODUCTS, product.to_document()?).await?;
    }
    tracing::info!(count = 2, "catalog seeded");

    Ok((notebook, lamp))
}
