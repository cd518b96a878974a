use common::ProductId;
use criterion::{Criterion, criterion_group, criterion_main};
use document_store::{DocumentStore, InMemoryDocumentStore};
use serde_json::json;
use shop::collections::PRODUCTS;
use shop::{Cart, Product, User, Users, resolve_cart};

fn seed_catalog(rt: &tokio::runtime::Runtime, store: &InMemoryDocumentStore, n: usize) -> Vec<Product> {
    let products: Vec<Product> = (0..n)
        .map(|i| {
            Product::new(ProductId::new())
                .with_field("title", json!(format!("Product {i}")))
                .with_field("price", json!(i as f64 + 0.99))
        })
        .collect();

    rt.block_on(async {
        for product in &products {
            store
                .insert_one(PRODUCTS, product.to_document().unwrap())
                .await
                .unwrap();
        }
    });
    products
}

fn bench_cart_merge(c: &mut Criterion) {
    let ids: Vec<ProductId> = (0..50).map(|_| ProductId::new()).collect();

    c.bench_function("cart/merge_50_lines_x4", |b| {
        b.iter(|| {
            let mut cart = Cart::new();
            for _ in 0..4 {
                for id in &ids {
                    cart = cart.with_line_added(*id, 1).unwrap();
                }
            }
            cart
        });
    });
}

fn bench_add_line(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryDocumentStore::new();
    let products = seed_catalog(&rt, &store, 10);
    let users = Users::new(store);
    let mut user = rt
        .block_on(users.register(User::new("Bench", "bench@example.com")))
        .unwrap();

    c.bench_function("cart/add_line", |b| {
        let mut i = 0;
        b.iter(|| {
            let product = &products[i % products.len()];
            i += 1;
            rt.block_on(user.add_one(product)).unwrap();
        });
    });
}

fn bench_resolve_cart(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryDocumentStore::new();
    let products = seed_catalog(&rt, &store, 200);

    // 50 catalog products plus 5 that have been removed
    let cart = Cart::from_lines(
        products
            .iter()
            .take(50)
            .map(|p| (p.id(), 2))
            .chain((0..5).map(|_| (ProductId::new(), 1))),
    )
    .unwrap();

    c.bench_function("cart/resolve_55_lines", |b| {
        b.iter(|| rt.block_on(resolve_cart(&store, &cart)).unwrap());
    });
}

fn bench_convert_cart_to_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryDocumentStore::new();
    let products = seed_catalog(&rt, &store, 20);
    let users = Users::new(store);

    c.bench_function("order/fill_and_convert_20_lines", |b| {
        b.iter(|| {
            rt.block_on(async {
                let mut user = users
                    .register(User::new("Bench", "bench@example.com"))
                    .await
                    .unwrap();
                for product in &products {
                    user.add_one(product).await.unwrap();
                }
                user.convert_cart_to_order().await.unwrap()
            })
        });
    });
}

criterion_group!(
    benches,
    bench_cart_merge,
    bench_add_line,
    bench_resolve_cart,
    bench_convert_cart_to_order
);
criterion_main!(benches);
