//! `HttpBackend` against a local axum stub of the REST service.
//!
//! The stub answers from a table of canned responses keyed by method and path, and
//! records every request it receives.

use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::Router;
use order_desk::api::{ApiError, CashBoxApi, CatalogApi, HttpBackend, OrderApi, TableApi};
use order_desk::model::{
    CreateOrderRequest, OrderDetail, OrderFilter, OrderId, OrderStatus, PaymentMethodId,
    ProductFilter, ProductId, TableFilter, TableId, UpdateOrderRequest,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
struct Seen {
    method: Method,
    path: String,
    query: Option<String>,
    authorization: Option<String>,
    body: Option<Value>,
}

#[derive(Clone, Default)]
struct Stub {
    responses: Arc<HashMap<(Method, String), (StatusCode, String)>>,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl Stub {
    fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }
}

async fn answer(
    State(stub): State<Stub>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    stub.seen.lock().unwrap().push(Seen {
        method: method.clone(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_str(&body).ok(),
    });
    stub.responses
        .get(&(method, uri.path().to_string()))
        .cloned()
        .unwrap_or((StatusCode::NOT_FOUND, r#"{"message":"no route"}"#.to_string()))
}

/// Starts the stub and returns a backend pointed at it.
async fn serve(routes: Vec<(Method, &str, StatusCode, Value)>) -> (HttpBackend, Stub) {
    let responses = routes
        .into_iter()
        .map(|(method, path, status, body)| ((method, path.to_string()), (status, body.to_string())))
        .collect();
    let stub = Stub {
        responses: Arc::new(responses),
        ..Default::default()
    };
    let app = Router::new().fallback(answer).with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let backend = HttpBackend::new(&format!("http://{addr}/api/"), Duration::from_secs(5))
        .unwrap()
        .with_token("secret");
    (backend, stub)
}

fn order_json(id: u32, table: u32) -> Value {
    json!({
        "id": id,
        "orderNumber": format!("ORD-{id:05}"),
        "status": "Pendiente",
        "tableId": table,
        "paymentMethodId": 1,
        "subTotal": 20.0,
        "total": 20.0,
        "isPaid": false,
        "orderDetails": [{
            "productId": 1, "productName": "Ceviche", "quantity": 2,
            "unitPrice": 10.0, "subTotal": 20.0, "total": 20.0
        }]
    })
}

#[tokio::test]
async fn filters_travel_as_camel_case_query_strings() {
    let (backend, stub) = serve(vec![
        (
            Method::GET,
            "/api/tables/with-orders",
            StatusCode::OK,
            json!({ "tables": [{ "id": 1, "name": "Mesa 1", "isOccupied": false }], "total": 1, "page": 1, "pageSize": 10 }),
        ),
        (
            Method::GET,
            "/api/orders",
            StatusCode::OK,
            json!({ "orders": [order_json(3, 4)], "total": 1, "page": 1, "pageSize": 50 }),
        ),
    ])
    .await;

    let page = backend
        .tables_with_orders(&TableFilter {
            page: Some(1),
            page_size: Some(10),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.tables[0].id, TableId(1));
    assert!(page.tables[0].is_active);

    let orders = backend
        .list_orders(&OrderFilter::unpaid_for(TableId(4)).page(1, 50))
        .await
        .unwrap();
    assert_eq!(orders.orders[0].id, OrderId(3));
    assert_eq!(orders.orders[0].total, Decimal::new(2000, 2));

    let seen = stub.seen();
    assert_eq!(seen[0].query.as_deref(), Some("page=1&pageSize=10"));
    assert_eq!(
        seen[1].query.as_deref(),
        Some("page=1&pageSize=50&tableId=4&isPaid=false")
    );
    assert!(seen
        .iter()
        .all(|request| request.authorization.as_deref() == Some("Bearer secret")));
}

#[tokio::test]
async fn missing_cash_box_is_none() {
    let (backend, _stub) = serve(vec![(
        Method::GET,
        "/api/smallbox/active",
        StatusCode::NOT_FOUND,
        json!({ "message": "No hay caja abierta" }),
    )])
    .await;

    assert!(backend.active_cash_box().await.unwrap().is_none());
}

#[tokio::test]
async fn open_cash_box_is_decoded() {
    let (backend, _stub) = serve(vec![(
        Method::GET,
        "/api/smallbox/active",
        StatusCode::OK,
        json!({ "id": 5, "initialAmount": 100.0, "isClosed": false, "userId": 1, "currentBalance": 100.0 }),
    )])
    .await;

    let cash_box = backend.active_cash_box().await.unwrap().unwrap();
    assert!(!cash_box.is_closed);
    assert_eq!(cash_box.current_balance, Decimal::new(100, 0));
}

#[tokio::test]
async fn error_statuses_are_mapped() {
    let (backend, _stub) = serve(vec![
        (
            Method::GET,
            "/api/smallbox/active",
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "message": "boom" }),
        ),
        (
            Method::GET,
            "/api/paymentmethods",
            StatusCode::UNAUTHORIZED,
            json!({ "message": "token expired" }),
        ),
        (
            Method::GET,
            "/api/orders/9",
            StatusCode::OK,
            json!({ "unexpected": true }),
        ),
    ])
    .await;

    match backend.active_cash_box().await {
        Err(ApiError::Rejected { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected a rejection, got {other:?}"),
    }
    assert!(matches!(
        backend.payment_methods().await,
        Err(ApiError::Unauthorized)
    ));
    assert!(matches!(
        backend.get_order(OrderId(9)).await,
        Err(ApiError::InvalidResponse(_))
    ));
    assert!(matches!(
        backend.get_order(OrderId(10)).await,
        Err(ApiError::NotFound(message)) if message == "no route"
    ));
}

#[tokio::test]
async fn order_writes_use_the_right_verbs() {
    let (backend, stub) = serve(vec![
        (Method::POST, "/api/orders", StatusCode::OK, order_json(7, 2)),
        (Method::PUT, "/api/orders/7", StatusCode::OK, order_json(7, 2)),
        (
            Method::PATCH,
            "/api/orders/7/mark-as-paid",
            StatusCode::OK,
            order_json(7, 2),
        ),
    ])
    .await;

    let request = CreateOrderRequest {
        table_id: TableId(2),
        payment_method_id: PaymentMethodId(1),
        worker_id: None,
        customer_name: None,
        order_type: None,
        observations: String::new(),
        discount: None,
        tax: None,
        order_details: vec![OrderDetail::line(
            ProductId(1),
            "Ceviche",
            Decimal::new(1000, 2),
            2,
        )],
    };
    let created = backend.create_order(&request).await.unwrap();
    assert_eq!(created.status, OrderStatus::Pending);

    backend
        .update_order(
            OrderId(7),
            &UpdateOrderRequest {
                table_id: TableId(2),
                payment_method_id: PaymentMethodId(2),
                status: OrderStatus::Completed,
                customer_name: Some("Rosa".into()),
                observations: None,
                is_paid: false,
            },
        )
        .await
        .unwrap();
    backend.mark_as_paid(OrderId(7)).await.unwrap();

    let seen = stub.seen();
    let create = seen[0].body.as_ref().unwrap();
    assert_eq!(seen[0].method, Method::POST);
    assert_eq!(create["tableId"], 2);
    assert_eq!(create["observations"], "");
    assert_eq!(create["orderDetails"][0]["subTotal"], 20.0);

    let update = seen[1].body.as_ref().unwrap();
    assert_eq!(seen[1].method, Method::PUT);
    assert_eq!(update["status"], "Completada");
    assert_eq!(update["isPaid"], false);
    assert_eq!(update["customerName"], "Rosa");

    assert_eq!(seen[2].method, Method::PATCH);
    assert_eq!(seen[2].path, "/api/orders/7/mark-as-paid");
}

#[tokio::test]
async fn catalog_pages_are_unwrapped() {
    let (backend, stub) = serve(vec![
        (
            Method::GET,
            "/api/products",
            StatusCode::OK,
            json!({ "products": [{ "id": 1, "name": "Ceviche", "price": 10.0 }], "total": 1 }),
        ),
        (
            Method::GET,
            "/api/paymentmethods",
            StatusCode::OK,
            json!({ "paymentMethods": [{ "id": 1, "name": "Efectivo" }, { "id": 2, "name": "Tarjeta" }] }),
        ),
    ])
    .await;

    let products = backend
        .products(&ProductFilter {
            search: Some("cev".into()),
            is_active: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(products[0].price, Decimal::new(10, 0));
    let methods = backend.payment_methods().await.unwrap();
    assert_eq!(methods.len(), 2);

    let seen = stub.seen();
    assert_eq!(seen[0].query.as_deref(), Some("search=cev&isActive=true"));
    assert_eq!(seen[1].query.as_deref(), Some("pageSize=100"));
}

#[tokio::test]
async fn lounges_and_categories_are_unwrapped() {
    let (backend, stub) = serve(vec![
        (
            Method::GET,
            "/api/lounges",
            StatusCode::OK,
            json!({ "lounges": [{ "id": 1, "Name": "Terraza", "isActive": true }], "total": 1 }),
        ),
        (
            Method::GET,
            "/api/categories",
            StatusCode::OK,
            json!({ "categories": [{ "id": 3, "name": "Bebidas", "description": null, "isActive": true, "productCount": 2 }] }),
        ),
    ])
    .await;

    let lounges = backend.lounges().await.unwrap();
    assert_eq!(lounges[0].name, "Terraza");
    let categories = backend.categories().await.unwrap();
    assert_eq!(categories[0].product_count, 2);

    let seen = stub.seen();
    assert_eq!(seen[0].query.as_deref(), Some("isActive=true&pageSize=100"));
    assert_eq!(seen[1].path, "/api/categories");
    assert_eq!(seen[1].query, None);
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend = HttpBackend::new(&format!("http://{addr}/api"), Duration::from_secs(1)).unwrap();
    assert_eq!(backend.base_url(), format!("http://{addr}/api"));
    assert!(matches!(
        backend.active_cash_box().await,
        Err(ApiError::Http(_))
    ));
}
