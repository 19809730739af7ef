//! HTTP implementation of the routing backend client.

use std::time::Duration;

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;

use super::{ApiError, FleetApi, GeometryResponse, LineString, Route, VehiclePosition};

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Routing backend client over HTTP using reqwest.
pub struct HttpFleetApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFleetApi {
    /// Creates a client for the backend at `base_url` (scheme + host +
    /// optional port, no trailing slash required).
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a client with a custom request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ApiError::Http(format!("failed to create http client: {}", e)))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
        url: &str,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Http(format!("failed to read response: {}", e)))?;

        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, ApiError> {
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Http(format!("request failed: {}", e)))?;

        Self::decode(response, &url).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        url: String,
        body: serde_json::Value,
    ) -> Result<T, ApiError> {
        let payload = serde_json::to_vec(&body).map_err(|e| ApiError::Decode(e.to_string()))?;

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| ApiError::Http(format!("request failed: {}", e)))?;

        Self::decode(response, &url).await
    }
}

impl FleetApi for HttpFleetApi {
    fn active_routes(&self) -> BoxFuture<'_, Result<Vec<Route>, ApiError>> {
        Box::pin(async move { self.get_json(self.url("/routing/active-routes")).await })
    }

    fn route_geometry<'a>(
        &'a self,
        coords: Vec<[f64; 2]>,
        profile: &'a str,
    ) -> BoxFuture<'a, Result<LineString, ApiError>> {
        Box::pin(async move {
            let body = serde_json::json!({ "coords": coords, "profile": profile });
            let response: GeometryResponse = self
                .post_json(self.url("/routing/route-geometry"), body)
                .await?;
            Ok(response.geometry)
        })
    }

    fn live_positions(&self, advance: bool) -> BoxFuture<'_, Result<Vec<VehiclePosition>, ApiError>> {
        Box::pin(async move {
            self.get_json(self.url(&format!("/routing/live-positions?advance={}", advance)))
                .await
        })
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted backend for unit tests.
    ///
    /// Route and position responses are set up front; geometry requests
    /// echo the submitted coordinates as a straight LineString, matching
    /// the backend's fallback behavior, unless an error is scripted.
    pub struct MockFleetApi {
        routes: Mutex<Result<Vec<Route>, ApiError>>,
        positions: Mutex<Result<Vec<VehiclePosition>, ApiError>>,
        geometry_error: Mutex<Option<ApiError>>,
        pub route_requests: AtomicUsize,
        pub geometry_requests: AtomicUsize,
        pub position_requests: AtomicUsize,
    }

    impl MockFleetApi {
        pub fn new() -> Self {
            Self {
                routes: Mutex::new(Ok(Vec::new())),
                positions: Mutex::new(Ok(Vec::new())),
                geometry_error: Mutex::new(None),
                route_requests: AtomicUsize::new(0),
                geometry_requests: AtomicUsize::new(0),
                position_requests: AtomicUsize::new(0),
            }
        }

        pub fn set_routes(&self, routes: Result<Vec<Route>, ApiError>) {
            *self.routes.lock() = routes;
        }

        pub fn set_positions(&self, positions: Result<Vec<VehiclePosition>, ApiError>) {
            *self.positions.lock() = positions;
        }

        pub fn fail_geometry(&self, error: ApiError) {
            *self.geometry_error.lock() = Some(error);
        }
    }

    impl FleetApi for MockFleetApi {
        fn active_routes(&self) -> BoxFuture<'_, Result<Vec<Route>, ApiError>> {
            self.route_requests.fetch_add(1, Ordering::Relaxed);
            let result = self.routes.lock().clone();
            Box::pin(async move { result })
        }

        fn route_geometry<'a>(
            &'a self,
            coords: Vec<[f64; 2]>,
            _profile: &'a str,
        ) -> BoxFuture<'a, Result<LineString, ApiError>> {
            self.geometry_requests.fetch_add(1, Ordering::Relaxed);
            let error = self.geometry_error.lock().clone();
            Box::pin(async move {
                match error {
                    Some(e) => Err(e),
                    None => Ok(LineString {
                        kind: "LineString".to_string(),
                        coordinates: coords,
                    }),
                }
            })
        }

        fn live_positions(
            &self,
            _advance: bool,
        ) -> BoxFuture<'_, Result<Vec<VehiclePosition>, ApiError>> {
            self.position_requests.fetch_add(1, Ordering::Relaxed);
            let result = self.positions.lock().clone();
            Box::pin(async move { result })
        }
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let api = HttpFleetApi::new("http://127.0.0.1:8000/").unwrap();
        assert_eq!(
            api.url("/routing/active-routes"),
            "http://127.0.0.1:8000/routing/active-routes"
        );
    }

    #[tokio::test]
    async fn test_mock_geometry_echoes_straight_line() {
        let api = MockFleetApi::new();
        let coords = vec![[-79.38, 43.65], [-79.39, 43.66]];
        let line = api.route_geometry(coords.clone(), "driving").await.unwrap();
        assert_eq!(line.coordinates, coords);
        assert!(line.is_drawable());
        assert_eq!(api.geometry_requests.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_mock_scripted_failure() {
        let api = MockFleetApi::new();
        api.set_positions(Err(ApiError::Http("connection refused".to_string())));
        let result = api.live_positions(true).await;
        assert!(result.is_err());
    }
}
