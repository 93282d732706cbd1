//! HTTP client for the Commerce API
//!
//! Customer self-registration is not exposed here; the CLI is for
//! back-office staff working against their own organization.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// HTTP client for communicating with the Commerce API
#[derive(Clone)]
pub struct CommerceClient {
    client: reqwest::Client,
    base_url: String,
}

impl CommerceClient {
    /// Create a new client with explicit configuration
    ///
    /// Without a token only `login` and the health check will succeed.
    pub fn new(base_url: &str, token: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))
                    .context("Invalid token format")?,
            );
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[cfg(test)]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<Value> {
        self.get_json("/health", &()).await
    }

    /// Exchange credentials for a bearer token
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        self.post_json(
            "/auth/login",
            &LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            },
        )
        .await
    }

    pub async fn me(&self) -> Result<Value> {
        self.get_json("/auth/me", &()).await
    }

    // --- Catalog ---

    pub async fn list_products(&self, query: &ProductQuery) -> Result<Value> {
        self.get_json("/products", query).await
    }

    pub async fn create_product(&self, product: &NewProduct) -> Result<Value> {
        self.post_json("/products", product).await
    }

    /// Add (or with a negative delta, remove) units of stock
    pub async fn adjust_stock(&self, product_id: Uuid, delta: i32) -> Result<Value> {
        self.post_json(
            &format!("/products/{}/stock", product_id),
            &AdjustStockRequest { delta },
        )
        .await
    }

    // --- Orders ---

    pub async fn list_org_orders(&self, status: Option<&str>) -> Result<Value> {
        self.get_json("/orders/organization", &StatusQuery { status }).await
    }

    pub async fn update_order_status(&self, order_id: Uuid, status: &str) -> Result<Value> {
        self.patch_json(
            &format!("/orders/{}/status", order_id),
            &UpdateStatusRequest {
                status: status.to_string(),
            },
        )
        .await
    }

    // --- Bills ---

    pub async fn create_bill(&self, bill: &NewBill) -> Result<Value> {
        self.post_json("/bills", bill).await
    }

    pub async fn list_bills(&self, range: &DateRange) -> Result<Value> {
        self.get_json("/bills", range).await
    }

    pub async fn record_payment(&self, bill_id: Uuid, amount: f64) -> Result<Value> {
        self.post_json(
            &format!("/bills/{}/payments", bill_id),
            &PaymentRequest { amount },
        )
        .await
    }

    pub async fn bill_summary(&self, range: &DateRange) -> Result<Value> {
        self.get_json("/bills/summary", range).await
    }

    // --- Attendance and payroll ---

    pub async fn mark_attendance(&self, mark: &MarkAttendance) -> Result<Value> {
        self.post_json("/attendance", mark).await
    }

    pub async fn list_attendance(
        &self,
        user_id: Option<Uuid>,
        month: Option<&str>,
    ) -> Result<Value> {
        self.get_json(
            "/attendance",
            &MonthQuery {
                user_id,
                month,
                policy: None,
            },
        )
        .await
    }

    pub async fn salary(
        &self,
        user_id: Uuid,
        month: Option<&str>,
        policy: Option<&str>,
    ) -> Result<Value> {
        self.get_json(
            &format!("/salary/{}", user_id),
            &MonthQuery {
                user_id: None,
                month,
                policy,
            },
        )
        .await
    }

    pub async fn salary_report(&self, month: Option<&str>, policy: Option<&str>) -> Result<Value> {
        self.get_json(
            "/salary/report",
            &MonthQuery {
                user_id: None,
                month,
                policy,
            },
        )
        .await
    }

    // --- Internal helpers ---

    async fn get_json<Q, T>(&self, path: &str, query: &Q) -> Result<T>
    where
        Q: Serialize + ?Sized,
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to GET {}", path))?;

        handle_json_response(response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize,
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to POST {}", path))?;

        handle_json_response(response).await
    }

    async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize,
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .patch(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to PATCH {}", path))?;

        handle_json_response(response).await
    }
}

async fn handle_json_response<T>(response: reqwest::Response) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let status = response.status();
    let body = response
        .text()
        .await
        .context("Failed to read response body")?;

    if !status.is_success() {
        anyhow::bail!("API error ({}): {}", status, body);
    }

    serde_json::from_str(&body).with_context(|| format!("Unexpected response body: {}", body))
}

// --- Request and response types ---

#[derive(Debug, Serialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: Value,
}

#[derive(Debug, Default, Serialize)]
pub struct ProductQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    pub include_inactive: bool,
}

#[derive(Debug, Serialize)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub stock_quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
struct AdjustStockRequest {
    delta: i32,
}

#[derive(Debug, Serialize)]
struct StatusQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct UpdateStatusRequest {
    status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BillItem {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct NewBill {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    pub items: Vec<BillItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<f64>,
    pub paid_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct DateRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
struct PaymentRequest {
    amount: f64,
}

#[derive(Debug, Serialize)]
pub struct MarkAttendance {
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
struct MonthQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    month: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    policy: Option<&'a str>,
}
