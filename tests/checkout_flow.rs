use std::collections::HashMap;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_orders_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{
        cart::AddToCartRequest,
        orders::{CheckoutRequest, PaymentInput, ShippingInput},
    },
    error::AppError,
    middleware::auth::AuthUser,
    product_client::ProductClient,
    services::{cart_service, favorite_service, order_service},
    state::AppState,
};
use serde_json::{Value, json};
use uuid::Uuid;

/// In-process stand-in for the product catalog service. Lookups are counted
/// so tests can assert that an operation never reached the catalog.
#[derive(Clone, Default)]
struct Catalog {
    products: Arc<Mutex<HashMap<String, Value>>>,
    hits: Arc<AtomicUsize>,
}

impl Catalog {
    fn put(&self, id: &str, product: Value) {
        self.products.lock().unwrap().insert(id.to_string(), product);
    }

    fn set_field(&self, id: &str, field: &str, value: Value) {
        let mut products = self.products.lock().unwrap();
        let product = products.get_mut(id).expect("product in catalog");
        product[field] = value;
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn catalog_lookup(State(catalog): State<Catalog>, Path(id): Path<String>) -> impl IntoResponse {
    catalog.hits.fetch_add(1, Ordering::SeqCst);
    let products = catalog.products.lock().unwrap();
    match products.get(&id) {
        Some(product) => (StatusCode::OK, Json(json!({ "data": product }))).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Producto no encontrado" })),
        )
            .into_response(),
    }
}

async fn serve_catalog(catalog: Catalog) -> anyhow::Result<String> {
    let app = Router::new()
        .route("/products/{id}", get(catalog_lookup))
        .with_state(catalog);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

async fn setup() -> anyhow::Result<Option<(AppState, Catalog)>> {
    // Allow skipping when no DB is configured in the environment.
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(None);
            }
        };

    let pool = create_pool(&database_url).await?;
    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    let catalog = Catalog::default();
    catalog.put(
        "1",
        json!({ "id": 1, "nombre": "Zapatillas Trail", "precio": 10.0, "disponible": true, "stock": 25, "imagen_url": "https://cdn.example.com/img/zapatillas-trail.png" }),
    );
    catalog.put(
        "2",
        json!({ "id": 2, "nombre": "Calcetines Running", "precio": 25.0, "disponible": true, "stock": 40 }),
    );
    catalog.put(
        "3",
        json!({ "id": 3, "nombre": "Mochila Trekking", "precio": 55.5, "disponible": true, "stock": 5 }),
    );

    let base_url = serve_catalog(catalog.clone()).await?;
    let products = ProductClient::new(&base_url)?;

    Ok(Some((
        AppState {
            pool,
            orm,
            products,
        },
        catalog,
    )))
}

fn user() -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        role: "user".to_string(),
    }
}

fn add_request(product_id: &str, quantity: Option<i32>) -> AddToCartRequest {
    AddToCartRequest {
        product_id: product_id.to_string(),
        quantity,
    }
}

// Full flow against a real database and a stubbed catalog: cart mutation
// semantics, favorites idempotency, and the checkout pipeline.
#[tokio::test]
async fn cart_and_checkout_flow() -> anyhow::Result<()> {
    let Some((state, catalog)) = setup().await? else {
        return Ok(());
    };

    // --- cart mutation semantics ---
    let shopper = user();

    let (created, item) = cart_service::add_to_cart(&state, &shopper, add_request("1", Some(2))).await?;
    assert!(created);
    assert_eq!(item.quantity, 2);

    // Adding the same product merges quantities instead of overwriting.
    let (created, item) = cart_service::add_to_cart(&state, &shopper, add_request("1", Some(3))).await?;
    assert!(!created);
    assert_eq!(item.quantity, 5);

    // PATCH overwrites.
    let item = cart_service::set_quantity(&state, &shopper, "1", Some(2))
        .await?
        .expect("row kept");
    assert_eq!(item.quantity, 2);

    // Quantities below 1 are floored to 1.
    let (_, item) = cart_service::add_to_cart(&state, &shopper, add_request("2", Some(0))).await?;
    assert_eq!(item.quantity, 1);

    // Quantity 0 deletes the row.
    cart_service::add_to_cart(&state, &shopper, add_request("3", None)).await?;
    let deleted = cart_service::set_quantity(&state, &shopper, "3", Some(0)).await?;
    assert!(deleted.is_none());
    let cart = cart_service::list_cart(&state, &shopper).await?;
    assert_eq!(cart.items.len(), 2);
    assert!(cart.items.iter().all(|entry| entry.item.product_id != "3"));
    assert!(cart.items.iter().all(|entry| entry.product.is_some()));

    // Updating a row that does not exist is a 404; negative quantities are rejected.
    let err = cart_service::set_quantity(&state, &shopper, "3", Some(4))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    let err = cart_service::set_quantity(&state, &shopper, "1", Some(-1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Removal is idempotent.
    cart_service::remove_item(&state, &shopper, "no-such-row").await?;

    // Missing productId is rejected before any catalog call.
    let err = cart_service::add_to_cart(&state, &shopper, add_request("  ", Some(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // --- favorites ---
    let first = favorite_service::add_favorite(&state, &shopper, "1").await?;
    let second = favorite_service::add_favorite(&state, &shopper, "1").await?;
    assert_eq!(first.id, second.id);
    let favorites = favorite_service::list_favorites(&state, &shopper).await?;
    assert_eq!(favorites.items.len(), 1);
    assert!(favorites.items[0].product.is_some());
    favorite_service::remove_favorite(&state, &shopper, "1").await?;
    favorite_service::remove_favorite(&state, &shopper, "1").await?;
    let favorites = favorite_service::list_favorites(&state, &shopper).await?;
    assert!(favorites.items.is_empty());

    // --- checkout happy path: cart [1 x2 @10.00, 2 x1 @25.00] ---
    let checkout = CheckoutRequest {
        shipping: Some(ShippingInput {
            nombre: Some(" Ana ".to_string()),
            apellidos: Some("".to_string()),
            ..Default::default()
        }),
        payment: Some(PaymentInput {
            card_number: Some("4111 1111 1111 1111".to_string()),
            ..Default::default()
        }),
    };
    let order = order_service::checkout(&state, &shopper, checkout).await?;

    assert_eq!(order.status, "created");
    assert_eq!(order.total, 45.0);
    assert_eq!(order.items.len(), 2);
    let line = order
        .items
        .iter()
        .find(|line| line.product_id == "1")
        .expect("snapshot for product 1");
    assert_eq!(line.precio, 10.0);
    assert_eq!(line.quantity, 2);
    assert_eq!(line.nombre, "Zapatillas Trail");

    let shipping = order.shipping.expect("shipping kept");
    assert_eq!(shipping.nombre.as_deref(), Some("Ana"));
    assert_eq!(shipping.apellidos, None);
    let payment = order.payment.expect("payment kept");
    assert_eq!(payment.brand.as_deref(), Some("Visa"));
    assert_eq!(payment.last4.as_deref(), Some("1111"));
    assert_eq!(payment.method.as_deref(), Some("card"));

    // The cart is cleared by a successful checkout.
    let cart = cart_service::list_cart(&state, &shopper).await?;
    assert!(cart.items.is_empty());

    // --- snapshots are immune to later catalog changes ---
    catalog.set_field("1", "precio", json!(99.0));
    let orders = order_service::list_orders(&state, &shopper).await?;
    assert_eq!(orders.items.len(), 1);
    let stored = &orders.items[0];
    assert_eq!(stored.total, 45.0);
    let line = stored
        .items
        .iter()
        .find(|line| line.product_id == "1")
        .expect("snapshot for product 1");
    assert_eq!(line.precio, 10.0);
    catalog.set_field("1", "precio", json!(10.0));

    // --- unavailable product rejects the whole checkout ---
    let blocked = user();
    cart_service::add_to_cart(&state, &blocked, add_request("2", Some(1))).await?;
    cart_service::add_to_cart(&state, &blocked, add_request("3", Some(1))).await?;
    catalog.set_field("3", "disponible", json!(false));

    let err = order_service::checkout(&state, &blocked, CheckoutRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ProductUnavailable(ref id) if id == "3"));

    // No order was created and the cart is untouched.
    let orders = order_service::list_orders(&state, &blocked).await?;
    assert!(orders.items.is_empty());
    let cart = cart_service::list_cart(&state, &blocked).await?;
    assert_eq!(cart.items.len(), 2);
    catalog.set_field("3", "disponible", json!(true));

    // Unavailable products are also rejected at add time.
    catalog.set_field("2", "disponible", json!(false));
    let err = cart_service::add_to_cart(&state, &blocked, add_request("2", Some(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ProductUnavailable(ref id) if id == "2"));
    catalog.set_field("2", "disponible", json!(true));

    // --- empty cart is rejected before any catalog call ---
    let browser = user();
    let hits_before = catalog.hits();
    let err = order_service::checkout(&state, &browser, CheckoutRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::EmptyCart));
    assert_eq!(catalog.hits(), hits_before);

    Ok(())
}
