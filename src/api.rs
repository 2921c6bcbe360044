use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::models::{CourseOffering, Order, OrderPayload, TutorOffering};

/// Value shipped in the site's page templates until a real key is pasted in.
const PLACEHOLDER_API_KEY: &str = "ВАШ_API_КЛЮЧ";

#[derive(Debug, Error)]
pub enum ApiClientError {
    #[error("API key is not configured")]
    MissingApiKey,
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{message}")]
    Status { status: StatusCode, message: String },
    #[error("Invalid endpoint: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Clone)]
pub struct BookingApiClient {
    client: reqwest::Client,
    base_url: Arc<Url>,
    api_key: Arc<str>,
}

impl BookingApiClient {
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: Arc::new(base_url),
            api_key: Arc::from(api_key.into()),
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty() && &*self.api_key != PLACEHOLDER_API_KEY
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiClientError> {
        if !self.has_api_key() {
            return Err(ApiClientError::MissingApiKey);
        }
        let mut url = self.base_url.join(path)?;
        url.query_pairs_mut().append_pair("api_key", &self.api_key);
        Ok(url)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiClientError> {
        let url = self.endpoint(path)?;
        debug!(%method, path, "booking API request");
        Ok(self.client.request(method, url))
    }

    /// Turns a non-2xx response into [`ApiClientError::Status`], preferring
    /// the `error` field of the JSON body as the message.
    async fn check(response: Response) -> Result<Response, ApiClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| value.get("error")?.as_str().map(str::to_string))
            .unwrap_or_else(|| {
                format!(
                    "{} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown status")
                )
            });
        error!(status = status.as_u16(), %message, "booking API returned an error");
        Err(ApiClientError::Status { status, message })
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiClientError> {
        let response = Self::check(request.send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    pub async fn fetch_courses(&self) -> Result<Vec<CourseOffering>, ApiClientError> {
        let courses: Vec<CourseOffering> =
            Self::send_json(self.request(Method::GET, "/api/courses")?).await?;
        info!(count = courses.len(), "fetched courses");
        Ok(courses)
    }

    pub async fn fetch_tutors(&self) -> Result<Vec<TutorOffering>, ApiClientError> {
        let tutors: Vec<TutorOffering> =
            Self::send_json(self.request(Method::GET, "/api/tutors")?).await?;
        info!(count = tutors.len(), "fetched tutors");
        Ok(tutors)
    }

    pub async fn fetch_orders(&self) -> Result<Vec<Order>, ApiClientError> {
        Self::send_json(self.request(Method::GET, "/api/orders")?).await
    }

    pub async fn fetch_order(&self, id: u64) -> Result<Order, ApiClientError> {
        Self::send_json(self.request(Method::GET, &format!("/api/orders/{id}"))?).await
    }

    pub async fn create_order(&self, payload: &OrderPayload) -> Result<Order, ApiClientError> {
        let order: Order =
            Self::send_json(self.request(Method::POST, "/api/orders")?.json(payload)).await?;
        info!(order_id = order.id, price = order.payload.price, "order created");
        Ok(order)
    }

    pub async fn update_order(
        &self,
        id: u64,
        payload: &OrderPayload,
    ) -> Result<Order, ApiClientError> {
        let request = self
            .request(Method::PUT, &format!("/api/orders/{id}"))?
            .json(payload);
        let order: Order = Self::send_json(request).await?;
        info!(order_id = order.id, price = order.payload.price, "order updated");
        Ok(order)
    }

    pub async fn delete_order(&self, id: u64) -> Result<(), ApiClientError> {
        let request = self.request(Method::DELETE, &format!("/api/orders/{id}"))?;
        Self::check(request.send().await?).await?;
        info!(order_id = id, "order deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_appends_api_key() {
        let client = BookingApiClient::new(Url::parse("https://example.com").unwrap(), "k-123");
        let url = client.endpoint("/api/courses").unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/courses?api_key=k-123");
    }

    #[test]
    fn test_missing_or_placeholder_key_is_rejected() {
        let base = Url::parse("https://example.com").unwrap();
        for key in ["", "   ", PLACEHOLDER_API_KEY] {
            let client = BookingApiClient::new(base.clone(), key);
            assert!(!client.has_api_key());
            assert!(matches!(
                client.endpoint("/api/tutors"),
                Err(ApiClientError::MissingApiKey)
            ));
        }
    }
}
