use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use used_car_marketplace::config::environment::EnvironmentConfig;
use used_car_marketplace::create_router;
use used_car_marketplace::repositories::{MemoryListingRepository, MemoryUserRepository, UserRepository};
use used_car_marketplace::services::{AuthService, FixedDetailGenerator, PricePredictor, VehicleInfoService};
use used_car_marketplace::state::AppState;
use used_car_marketplace::utils::jwt::JwtConfig;

async fn test_state(with_model: bool) -> AppState {
    let config = EnvironmentConfig::default();
    let users: Arc<dyn UserRepository> = Arc::new(MemoryUserRepository::new());
    let predictor = if with_model {
        Some(PricePredictor::load(concat!(env!("CARGO_MANIFEST_DIR"), "/car_price_model.json")).unwrap())
    } else {
        None
    };

    let state = AppState::new(
        config.clone(),
        Arc::new(MemoryListingRepository::new()),
        users.clone(),
        Arc::new(FixedDetailGenerator),
        predictor,
        VehicleInfoService::seeded(7),
    )
    .with_auth(AuthService::new(users, JwtConfig::from(&config)).with_cost(4));

    state.marketplace.seed_sample_data().await.unwrap();
    state
}

async fn create_test_app(with_model: bool) -> Router {
    create_router(test_state(with_model).await)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn id_of(app: &Router, model: &str) -> String {
    let (_, body) = send(app, get("/api/car")).await;
    body["data"]["listings"]
        .as_array()
        .unwrap()
        .iter()
        .find(|l| l["model"] == model)
        .map(|l| l["id"].as_str().unwrap().to_string())
        .unwrap()
}

#[tokio::test]
async fn test_car_crud_flow() {
    let app = create_test_app(false).await;

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/car",
            json!({
                "brand": "Kia",
                "model": "Seltos",
                "year": 2022,
                "price": 1450000,
                "fuel": "Diesel",
                "transmission": "Automatic",
                "location": "Hyderabad"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 8);
    assert_eq!(body["data"]["km_driven"], 0);
    assert_eq!(body["data"]["seller_type"], "Individual");
    assert_eq!(body["data"]["status"], "available");

    let (status, body) = send(&app, get(&format!("/api/car/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["model"], "Seltos");

    let (status, body) = send(
        &app,
        json_request(Method::PUT, &format!("/api/car/{}", id), json!({ "price": 1400000, "status": "sold" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id.as_str());
    assert_eq!(body["data"]["price"], 1400000);
    assert_eq!(body["data"]["status"], "sold");

    let (_, body) = send(&app, get("/api/car?status=sold")).await;
    assert_eq!(body["data"]["total"], 1);

    let delete = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/car/{}", id))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, delete).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get(&format!("/api/car/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_missing_field_is_rejected_without_write() {
    let app = create_test_app(false).await;

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/car",
            json!({ "brand": "Kia", "model": "Seltos", "year": 2022, "fuel": "Diesel" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing required field: price");

    let (_, body) = send(&app, get("/api/car")).await;
    assert_eq!(body["data"]["total"], 6);
}

#[tokio::test]
async fn test_search_brand_and_max_price() {
    let app = create_test_app(false).await;

    let (status, body) = send(&app, get("/api/search?brand=maruti&max_price=700000")).await;
    assert_eq!(status, StatusCode::OK);
    let listings = body["data"]["listings"].as_array().unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0]["model"], "Swift");
    assert_eq!(listings[0]["price"], 650000);
    assert_eq!(listings[0]["formatted_price"], "₹6.5 L");

    let (_, body) = send(&app, get("/api/search?sort_by=price_low")).await;
    let prices: Vec<i64> = body["data"]["listings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["price"].as_i64().unwrap())
        .collect();
    assert!(prices.windows(2).all(|w| w[0] <= w[1]));

    let (status, _) = send(&app, get("/api/search?sort_by=cheapest")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_listings_endpoint_applies_filters_and_sort() {
    let app = create_test_app(false).await;

    let (status, body) = send(&app, get("/api/listings?brand=Maruti&sort_by=price_low")).await;
    assert_eq!(status, StatusCode::OK);
    let listings = body["data"]["listings"].as_array().unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0]["model"], "Swift");

    let (_, body) = send(&app, get("/api/listings?fuel=Diesel&sort_by=price_high")).await;
    let prices: Vec<i64> = body["data"]["listings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| {
            assert_eq!(l["fuel"], "Diesel");
            l["price"].as_i64().unwrap()
        })
        .collect();
    assert!(!prices.is_empty());
    assert!(prices.windows(2).all(|w| w[0] >= w[1]));

    let (status, body) = send(&app, get("/api/listings")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["listings"].as_array().unwrap().len(), 6);

    let (status, _) = send(&app, get("/api/listings?sort_by=cheapest")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_viewing_twice_adds_two_views() {
    let app = create_test_app(false).await;
    let id = id_of(&app, "City").await;

    let (_, before) = send(&app, get(&format!("/api/car/{}", id))).await;
    let views = before["data"]["views"].as_u64().unwrap();

    send(&app, get(&format!("/api/listings/{}", id))).await;
    let (status, after) = send(&app, get(&format!("/api/listings/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(after["data"]["views"].as_u64().unwrap(), views + 2);
    assert_ne!(after["data"]["last_updated"], before["data"]["last_updated"]);

    let (status, _) = send(&app, get("/api/listings/nothere")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_similar_featured_and_stats() {
    let app = create_test_app(false).await;
    let id = id_of(&app, "Swift").await;

    let (status, body) = send(&app, get(&format!("/api/listings/{}/similar", id))).await;
    assert_eq!(status, StatusCode::OK);
    let similar = body["data"]["listings"].as_array().unwrap();
    assert!(similar.len() <= 4);
    assert!(similar.iter().all(|s| s["id"] != id.as_str() && s["similarity_score"].as_u64().unwrap() > 0));

    let favorite = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/listings/{}/favorite", id))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, favorite).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, get("/api/listings/featured?limit=3")).await;
    let featured = body["data"]["listings"].as_array().unwrap();
    assert_eq!(featured.len(), 3);
    assert_eq!(featured[0]["id"], id.as_str());

    let (_, body) = send(&app, get("/api/stats")).await;
    assert_eq!(body["data"]["total_listings"], 6);
    assert_eq!(body["data"]["brands_distribution"]["Maruti"], 1);

    let (_, body) = send(&app, get("/api/locations")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_register_login_and_change_password() {
    let app = create_test_app(false).await;

    let (status, body) = send(
        &app,
        form_request("/register", "username=priya_s&email=priya%40example.com&password=Secret1"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["username"], "priya_s");
    assert!(body["data"].get("password_hash").is_none());

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/auth/register",
            json!({ "username": "priya_s", "email": "other@example.com", "password": "Secret1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Username already exists");

    let (status, body) = send(&app, form_request("/login", "username=priya_s&password=Wrong99")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid username or password");

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/auth/login", json!({ "username": "priya_s", "password": "Secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let unauthenticated = json_request(
        Method::PUT,
        "/api/auth/password",
        json!({ "old_password": "Secret1", "new_password": "Fresh2024" }),
    );
    let (status, _) = send(&app, unauthenticated).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let change = Request::builder()
        .method(Method::PUT)
        .uri("/api/auth/password")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(
            json!({ "old_password": "Secret1", "new_password": "Fresh2024" }).to_string(),
        ))
        .unwrap();
    let (status, body) = send(&app, change).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password changed successfully");

    let (status, _) = send(
        &app,
        json_request(Method::POST, "/api/auth/login", json!({ "username": "priya_s", "password": "Fresh2024" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_without_model_prediction_is_unavailable() {
    let app = create_test_app(false).await;

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["model_loaded"], false);

    let (status, _) = send(&app, json_request(Method::POST, "/api/predict", json!({ "brand": "Maruti" }))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_prediction_with_model() {
    let app = create_test_app(true).await;

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, get("/model-info")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["feature_count"], 15);
    assert_eq!(body["data"]["database_info"]["states_covered"], 20);

    let form = "brand=Maruti&year=2019&km_driven=25%2C000&fuel=Petrol&seller_type=Individual\
                &transmission=Manual&owner=First+Owner&mileage=21.4&engine=1197&max_power=82\
                &seats=5&torque_value=113&registration_number=KA01AB1234";
    let (status, body) = send(&app, form_request("/predict", form)).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    let price = data["predicted_price"].as_f64().unwrap();
    assert!(price > 0.0);
    assert!((data["confidence_lower"].as_f64().unwrap() - price * 0.85).abs() < 1e-6);
    assert!((data["confidence_upper"].as_f64().unwrap() - price * 1.15).abs() < 1e-6);
    assert_eq!(data["car_age"], 5);
    assert_eq!(data["real_time_info"]["registration_number"], "KA01AB1234");
    assert_eq!(data["real_time_info"]["state"], "Karnataka");

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/predict",
            json!({
                "brand": "Trabant", "year": 2019, "km_driven": 25000, "fuel": "Petrol",
                "seller_type": "Individual", "transmission": "Manual", "owner": "First Owner",
                "mileage": 21.4, "engine": 1197.0, "max_power": 82.0, "seats": 5, "torque_value": 113.0
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "PREDICTION_ERROR");
    assert_eq!(body["message"], "Unknown brand value: Trabant");
}

#[tokio::test]
async fn test_vehicle_info_lookup() {
    let app = create_test_app(false).await;

    let (status, body) = send(&app, get("/api/vehicle-info/MH12AB3456")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["state"], "Maharashtra");
    let score = body["data"]["compliance_score"].as_u64().unwrap();
    assert!(score <= 100);

    let (status, _) = send(&app, get("/api/vehicle-info/XX1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
