//! CORS configuration for the browser client

use axum::http::header;
use axum::http::{HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tracing::debug;

const LOCAL_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

/// Create a CORS layer with the specified allowed origins.
///
/// An empty list allows the local development origins only.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = if allowed_origins.is_empty() {
        debug!("CORS: No origins specified, allowing localhost only");
        LOCAL_ORIGINS
            .into_iter()
            .map(HeaderValue::from_static)
            .collect()
    } else {
        debug!("CORS: Allowing origins: {:?}", allowed_origins);
        allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect()
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::post;
    use tower::ServiceExt;

    fn app(origins: &[String]) -> axum::Router {
        axum::Router::new()
            .route("/get_transcript", post(|| async { "ok" }))
            .layer(cors_layer(origins))
    }

    async fn allow_origin_for(origins: &[String], origin: &str) -> Option<String> {
        let response = app(origins)
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/get_transcript")
                    .header("Origin", origin)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        response
            .headers()
            .get("access-control-allow-origin")
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_cors_empty_origins_allows_localhost() {
        assert_eq!(
            allow_origin_for(&[], "http://localhost:3000").await.as_deref(),
            Some("http://localhost:3000")
        );
    }

    #[tokio::test]
    async fn test_cors_empty_origins_blocks_other_origins() {
        assert!(allow_origin_for(&[], "https://example.com").await.is_none());
    }

    #[tokio::test]
    async fn test_cors_with_origins_allows_configured() {
        let origins = vec![
            "https://example.com".to_string(),
            "https://app.example.com".to_string(),
        ];

        assert_eq!(
            allow_origin_for(&origins, "https://app.example.com")
                .await
                .as_deref(),
            Some("https://app.example.com")
        );
        assert!(allow_origin_for(&origins, "http://localhost:3000")
            .await
            .is_none());
    }
}
