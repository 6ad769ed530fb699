pub mod forecasts;
pub mod health;
pub mod regions;

use axum::{routing::get, Router};
use sqlx::SqlitePool;

use crate::services::jma::JmaClient;
use forecasts::AppState;

/// API routes. Catalog and health routes use the pool directly; forecast
/// routes also need the upstream client.
pub fn router(pool: SqlitePool, jma_client: JmaClient) -> Router {
    let app_state = AppState {
        pool: pool.clone(),
        jma_client,
    };

    let region_routes = Router::new()
        .route("/api/v1/regions", get(regions::list_regions))
        .route(
            "/api/v1/regions/:region_name/prefectures",
            get(regions::list_prefectures),
        )
        .with_state(pool.clone());

    let forecast_routes = Router::new()
        .route(
            "/api/v1/forecasts/:prefecture_name",
            get(forecasts::get_prefecture_forecast),
        )
        .route(
            "/api/v1/forecasts/:prefecture_name/hourly",
            get(forecasts::get_prefecture_hourly_forecast),
        )
        .with_state(app_state);

    let health_routes = Router::new()
        .route("/api/v1/health", get(health::health_check))
        .with_state(pool);

    Router::new()
        .merge(health_routes)
        .merge(region_routes)
        .merge(forecast_routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::queries::tests::seed_catalog;
    use crate::db::test_pool;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt as _;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // 関東甲信地方, 空の地方, 東京都, ナルニア
    const KANTO: &str = "%E9%96%A2%E6%9D%B1%E7%94%B2%E4%BF%A1%E5%9C%B0%E6%96%B9";
    const EMPTY_REGION: &str = "%E7%A9%BA%E3%81%AE%E5%9C%B0%E6%96%B9";
    const TOKYO: &str = "%E6%9D%B1%E4%BA%AC%E9%83%BD";
    const NARNIA: &str = "%E3%83%8A%E3%83%AB%E3%83%8B%E3%82%A2";

    async fn app(jma_base_url: &str) -> Router {
        let pool = test_pool().await;
        seed_catalog(&pool).await;
        let client = JmaClient::new(jma_base_url, "test-agent").unwrap();
        router(pool, client)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Option<String>, Value) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let stale = resp
            .headers()
            .get(forecasts::STALE_HEADER)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, stale, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, _, body) = get_json(app("http://127.0.0.1:1").await, "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], true);
        assert_eq!(body["catalog_prefectures"], 1);
    }

    #[tokio::test]
    async fn test_health_degraded_without_catalog() {
        let client = JmaClient::new("http://127.0.0.1:1", "test-agent").unwrap();
        let app = router(test_pool().await, client);

        let (status, _, body) = get_json(app, "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["database"], true);
        assert_eq!(body["catalog_prefectures"], 0);
    }

    #[tokio::test]
    async fn test_regions_and_prefectures() {
        let app = app("http://127.0.0.1:1").await;

        let (status, _, body) = get_json(app.clone(), "/api/v1/regions").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!(["関東甲信地方", "空の地方"]));

        let uri = format!("/api/v1/regions/{}/prefectures", KANTO);
        let (status, _, body) = get_json(app.clone(), &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!(["東京都"]));

        let uri = format!("/api/v1/regions/{}/prefectures", EMPTY_REGION);
        let (status, _, body) = get_json(app, &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_daily_forecast() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast/data/forecast/130000.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "timeSeries": [{
                    "timeDefines": ["2024-01-01T09:00:00+09:00", "2024-01-01T15:00:00+09:00"],
                    "areas": [{
                        "area": {"name": "東京地方", "code": "130010"},
                        "weathers": ["晴れ", "曇り"],
                        "temps": ["5", "12"],
                        "pops": ["10", "20"]
                    }]
                }]
            }])))
            .mount(&mock_server)
            .await;

        let uri = format!("/api/v1/forecasts/{}", TOKYO);
        let (status, stale, body) = get_json(app(&mock_server.uri()).await, &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(stale, None);
        assert_eq!(body["prefecture_code"], "130000");
        assert_eq!(body["stale"], false);
        assert_eq!(body["days"][0]["forecast_date"], "2024-01-01");
        assert_eq!(body["days"][0]["temp_min"], "5");
        assert_eq!(body["days"][0]["temp_max"], "12");
    }

    #[tokio::test]
    async fn test_daily_forecast_upstream_down_is_stale_and_empty() {
        let uri = format!("/api/v1/forecasts/{}", TOKYO);
        let (status, stale, body) = get_json(app("http://127.0.0.1:1").await, &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(stale.as_deref(), Some("true"));
        assert_eq!(body["stale"], true);
        assert_eq!(body["days"], json!([]));
    }

    #[tokio::test]
    async fn test_unknown_prefecture_is_404() {
        let uri = format!("/api/v1/forecasts/{}", NARNIA);
        let (status, _, body) = get_json(app("http://127.0.0.1:1").await, &uri).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("ナルニア"));
    }

    #[tokio::test]
    async fn test_hourly_forecast() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast/data/forecast/130000.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "timeSeries": [{
                    "timeDefines": ["2024-01-01T06:00:00+09:00", "2024-01-01T12:00:00+09:00"],
                    "areas": [{
                        "area": {"name": "東京地方", "code": "130010"},
                        "weathers": ["小雨"],
                        "pops": ["60", ""]
                    }]
                }]
            }])))
            .mount(&mock_server)
            .await;

        let uri = format!("/api/v1/forecasts/{}/hourly", TOKYO);
        let (status, _, body) = get_json(app(&mock_server.uri()).await, &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["area"]["area_code"], "130010");
        assert_eq!(body["entries"][0]["forecast_time"], "06:00");
        assert_eq!(body["entries"][0]["weather_icon"], "🌦️");
        assert_eq!(body["entries"][0]["precipitation_probability"], "60");
        assert_eq!(body["entries"][1]["weather"], "");
        assert_eq!(body["entries"][1]["temperature"], Value::Null);
        assert_eq!(body["entries"][1]["precipitation_probability"], Value::Null);
    }
}
