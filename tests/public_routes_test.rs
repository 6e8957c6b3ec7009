mod common;

use actix_web::test;
use serde_json::{json, Value};
use serial_test::serial;

use common::TestApp;

#[actix_rt::test]
#[serial]
async fn test_health_reports_degraded_without_dependencies() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["services"]["mongodb"]["status"], "error");
    assert_eq!(body["services"]["google_maps"]["status"], "error");
    assert!(body["services"]["mapbox"].is_object());
    assert!(body["services"]["gemini"].is_object());
    assert!(body["version"].is_string());
}

#[actix_rt::test]
#[serial]
async fn test_maps_without_key_is_server_error() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/map/geocode")
        .set_json(json!({ "searchText": "Madrid" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 500);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Google Maps API key not configured");

    let req = test::TestRequest::post()
        .uri("/api/mapbox/pois-nearby")
        .set_json(json!({ "longitude": -3.7, "latitude": 40.4 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 500);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Mapbox API key not configured");
}

#[actix_rt::test]
#[serial]
async fn test_maps_request_validation() {
    let test_app = TestApp::new().await.with_unreachable_maps();
    let app = test::init_service(test_app.create_app()).await;

    let cases = [
        ("/api/map/geocode", json!({ "searchText": "   " }), "Search text is required"),
        ("/api/mapbox/geocode", json!({ "searchText": 12 }), "Search text is required"),
        ("/api/map/reverse-geocode", json!({ "latitude": 40.4 }), "Invalid coordinates"),
        (
            "/api/mapbox/reverse-geocode",
            json!({ "longitude": "200", "latitude": "40" }),
            "Longitude out of range",
        ),
        (
            "/api/map/pois-nearby",
            json!({ "longitude": -3.7, "latitude": -95 }),
            "Latitude out of range",
        ),
        ("/api/map/pois-by-city", json!({}), "City is required"),
    ];

    for (uri, payload, message) in cases {
        let req = test::TestRequest::post()
            .uri(uri)
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400, "{}", uri);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], message, "{}", uri);
    }
}

#[actix_rt::test]
#[serial]
async fn test_maps_upstream_failure_is_bad_gateway() {
    let test_app = TestApp::new().await.with_unreachable_maps();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/map/geocode")
        .set_json(json!({ "searchText": "Madrid" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 502);
}

#[actix_rt::test]
#[serial]
async fn test_pois_nearby_tolerates_failing_categories() {
    let test_app = TestApp::new().await.with_unreachable_maps();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/mapbox/pois-nearby")
        .set_json(json!({ "longitude": "-3.7038", "latitude": "40.4168" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["count"], 0);
    assert_eq!(body["pois"], json!([]));
}

#[actix_rt::test]
#[serial]
async fn test_generate_itinerary_validation_and_missing_key() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/ai/generate-itinerary")
        .set_json(json!({
            "destination": "Lisbon",
            "startDate": "2025-05-01",
            "endDate": "2025-05-03",
            "transportModes": []
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = test::TestRequest::post()
        .uri("/api/ai/generate-itinerary")
        .set_json(json!({
            "destination": "Lisbon",
            "startDate": "2025-05-01",
            "endDate": "2025-05-03",
            "transportModes": ["walking"],
            "preferences": "seafood"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 500);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Gemini API key not configured");
}

#[actix_rt::test]
#[serial]
async fn test_malformed_json_body() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/itineraries")
        .insert_header(("content-type", "application/json"))
        .set_payload("{ not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["message"].as_str().unwrap().starts_with("Invalid request body"));
}
