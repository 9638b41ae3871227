//! HTTP client for the storefront API.

use std::time::Duration;

use async_trait::async_trait;
use catalog::{CatalogError, CatalogSource};
use checkout::{CheckoutError, OrderGateway, OrderReceipt, OrderRequest};
use common::{AuthToken, Product};
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

use crate::auth::{AuthGateway, LOGIN_FAILED_MESSAGE, REGISTRATION_FAILED_MESSAGE, RegisterRequest};
use crate::{ClientError, Result};

const PRODUCTS_PATH: &str = "products";
const ORDER_PATH: &str = "update-products-quantity";
const LOGIN_PATH: &str = "api/auth/login";
const REGISTER_PATH: &str = "api/auth/register";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ProductsResponse {
    products: Vec<Product>,
}

#[derive(Debug, Default, Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

/// Client for every endpoint under `API_BASE_URL`.
///
/// Implements the catalog, order and auth ports, so one instance backs a
/// whole session. Cloning shares the connection pool.
#[derive(Debug, Clone)]
pub struct StorefrontApi {
    client: reqwest::Client,
    base_url: Url,
}

impl StorefrontApi {
    /// Creates a client. `base_url` must end in `/` for paths to join below it.
    pub fn new(base_url: Url) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, url::ParseError> {
        self.base_url.join(path)
    }
}

/// Reads `{ message }` from an error body, if there is one.
async fn error_message(response: reqwest::Response) -> Option<String> {
    let bytes = response.bytes().await.ok()?;
    serde_json::from_slice::<MessageBody>(&bytes)
        .unwrap_or_default()
        .message
        .filter(|m| !m.trim().is_empty())
}

#[async_trait]
impl CatalogSource for StorefrontApi {
    async fn fetch_products(
        &self,
        token: &AuthToken,
    ) -> std::result::Result<Vec<Product>, CatalogError> {
        let url = self
            .endpoint(PRODUCTS_PATH)
            .map_err(|e| CatalogError::Fetch(e.to_string()))?;

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, token.bearer())
            .send()
            .await
            .map_err(|e| CatalogError::Fetch(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(CatalogError::Unauthorized);
            }
            status => return Err(CatalogError::Fetch(format!("server returned {status}"))),
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CatalogError::Fetch(e.to_string()))?;
        let body: ProductsResponse = serde_json::from_slice(&bytes)?;
        Ok(body.products)
    }
}

#[async_trait]
impl OrderGateway for StorefrontApi {
    async fn place_order(
        &self,
        token: &AuthToken,
        order: &OrderRequest,
    ) -> std::result::Result<OrderReceipt, CheckoutError> {
        let url = self
            .endpoint(ORDER_PATH)
            .map_err(|e| CheckoutError::Transport(e.to_string()))?;

        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, token.bearer())
            .json(order)
            .send()
            .await
            .map_err(|e| CheckoutError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(CheckoutError::Unauthorized);
        }
        if !status.is_success() {
            tracing::debug!(%status, "order endpoint refused order");
            return Err(CheckoutError::rejected(error_message(response).await));
        }

        // The success body is free-form; only `message` is read.
        let bytes = response
            .bytes()
            .await
            .map_err(|e| CheckoutError::Transport(e.to_string()))?;
        Ok(serde_json::from_slice(&bytes).unwrap_or_default())
    }
}

#[async_trait]
impl AuthGateway for StorefrontApi {
    async fn login(&self, email: &str, password: &SecretString) -> Result<AuthToken> {
        let response = self
            .client
            .post(self.endpoint(LOGIN_PATH)?)
            .json(&serde_json::json!({
                "email": email,
                "password": password.expose_secret(),
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "login refused");
            return Err(ClientError::Auth(LOGIN_FAILED_MESSAGE.to_string()));
        }

        let body: LoginResponse = response.json().await?;
        let token = AuthToken::new(body.token);
        if token.is_blank() {
            return Err(ClientError::Auth(LOGIN_FAILED_MESSAGE.to_string()));
        }
        Ok(token)
    }

    async fn register(&self, request: &RegisterRequest) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint(REGISTER_PATH)?)
            .json(&serde_json::json!({
                "name": request.name,
                "email": request.email,
                "mobile": request.mobile,
                "address": request.address,
                "password": request.password.expose_secret(),
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let message = error_message(response)
                .await
                .unwrap_or_else(|| REGISTRATION_FAILED_MESSAGE.to_string());
            return Err(ClientError::Auth(message));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_join_below_base() {
        let api = StorefrontApi::new(Url::parse("http://shop.local/v1/").unwrap()).unwrap();
        assert_eq!(
            api.endpoint(ORDER_PATH).unwrap().as_str(),
            "http://shop.local/v1/update-products-quantity"
        );
        assert_eq!(
            api.endpoint(LOGIN_PATH).unwrap().as_str(),
            "http://shop.local/v1/api/auth/login"
        );
    }

    #[test]
    fn test_products_response_uses_wire_names() {
        let body: ProductsResponse = serde_json::from_str(
            r#"{"products":[{"id":3,"name":"Mug","description":"","price":12.5,"quantity":4}]}"#,
        )
        .unwrap();
        assert_eq!(body.products[0].available_stock, 4);
    }
}
