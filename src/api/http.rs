//! REST implementation of the collaborator traits.

use crate::api::{ApiError, ApiResult, CashBoxApi, CatalogApi, OrderApi, TableApi};
use crate::model::{
    CashBox, CashBoxId, CashMovement, CashMovementRequest, CategoriesPage, Category,
    CloseCashBoxRequest, CreateOrderRequest, Lounge, LoungesPage, OpenCashBoxRequest, Order,
    OrderFilter, OrderId, OrdersPage, PaymentMethod, PaymentMethodsPage, Product,
    ProductFilter, ProductsPage, TableFilter, TablesPage, UpdateOrderRequest,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

/// Error body returned by the backend on failures.
#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Talks to the restaurant REST API with JSON bodies and an optional bearer token.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await?;
        handle_response(response).await
    }
}

async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.message)
            .unwrap_or(text);
        debug!(status = status.as_u16(), %message, "Request rejected");
        return Err(match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            _ => ApiError::rejected(status.as_u16(), message),
        });
    }
    serde_json::from_str(&text).map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl CashBoxApi for HttpBackend {
    #[instrument(skip(self))]
    async fn active_cash_box(&self) -> ApiResult<Option<CashBox>> {
        let request = self.client.get(self.url("/smallbox/active"));
        match self.send::<CashBox>(request).await {
            Ok(cash_box) => Ok(Some(cash_box)),
            // No open session is reported as 404.
            Err(ApiError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    async fn open_cash_box(&self, request: &OpenCashBoxRequest) -> ApiResult<CashBox> {
        self.send(self.client.post(self.url("/smallbox")).json(request))
            .await
    }

    #[instrument(skip(self))]
    async fn close_cash_box(
        &self,
        id: CashBoxId,
        request: &CloseCashBoxRequest,
    ) -> ApiResult<CashBox> {
        let path = format!("/smallbox/{}/close", id.0);
        self.send(self.client.patch(self.url(&path)).json(request))
            .await
    }

    #[instrument(skip(self))]
    async fn record_movement(&self, request: &CashMovementRequest) -> ApiResult<CashMovement> {
        self.send(
            self.client
                .post(self.url("/smallbox/cash-movement"))
                .json(request),
        )
        .await
    }
}

#[async_trait]
impl OrderApi for HttpBackend {
    #[instrument(skip(self))]
    async fn list_orders(&self, filter: &OrderFilter) -> ApiResult<OrdersPage> {
        self.send(self.client.get(self.url("/orders")).query(filter))
            .await
    }

    #[instrument(skip(self))]
    async fn get_order(&self, id: OrderId) -> ApiResult<Order> {
        let path = format!("/orders/{}", id.0);
        self.send(self.client.get(self.url(&path))).await
    }

    #[instrument(skip(self, request), fields(table = %request.table_id))]
    async fn create_order(&self, request: &CreateOrderRequest) -> ApiResult<Order> {
        debug!(?request, "Creating order");
        self.send(self.client.post(self.url("/orders")).json(request))
            .await
    }

    #[instrument(skip(self, request))]
    async fn update_order(&self, id: OrderId, request: &UpdateOrderRequest) -> ApiResult<Order> {
        debug!(?request, "Updating order");
        let path = format!("/orders/{}", id.0);
        self.send(self.client.put(self.url(&path)).json(request))
            .await
    }

    #[instrument(skip(self))]
    async fn mark_as_paid(&self, id: OrderId) -> ApiResult<Order> {
        let path = format!("/orders/{}/mark-as-paid", id.0);
        self.send(self.client.patch(self.url(&path))).await
    }
}

#[async_trait]
impl TableApi for HttpBackend {
    #[instrument(skip(self))]
    async fn tables_with_orders(&self, filter: &TableFilter) -> ApiResult<TablesPage> {
        self.send(self.client.get(self.url("/tables/with-orders")).query(filter))
            .await
    }
}

#[async_trait]
impl CatalogApi for HttpBackend {
    #[instrument(skip(self))]
    async fn products(&self, filter: &ProductFilter) -> ApiResult<Vec<Product>> {
        let page: ProductsPage = self
            .send(self.client.get(self.url("/products")).query(filter))
            .await?;
        Ok(page.products)
    }

    #[instrument(skip(self))]
    async fn payment_methods(&self) -> ApiResult<Vec<PaymentMethod>> {
        let page: PaymentMethodsPage = self
            .send(
                self.client
                    .get(self.url("/paymentmethods"))
                    .query(&[("pageSize", 100)]),
            )
            .await?;
        Ok(page.payment_methods)
    }

    #[instrument(skip(self))]
    async fn categories(&self) -> ApiResult<Vec<Category>> {
        let page: CategoriesPage = self.send(self.client.get(self.url("/categories"))).await?;
        Ok(page.categories)
    }

    #[instrument(skip(self))]
    async fn lounges(&self) -> ApiResult<Vec<Lounge>> {
        let page: LoungesPage = self
            .send(
                self.client
                    .get(self.url("/lounges"))
                    .query(&[("isActive", "true"), ("pageSize", "100")]),
            )
            .await?;
        Ok(page.lounges)
    }
}
