mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::{json, Value};

fn content(body: &Value) -> Vec<Value> {
    body["data"]["content"].as_array().cloned().unwrap_or_default()
}

fn names(body: &Value, key: &str) -> Vec<String> {
    let mut names: Vec<String> = content(body)
        .iter()
        .filter_map(|row| row[key].as_str().map(str::to_string))
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn search_requires_authentication() -> Result<()> {
    let app = common::TestApp::spawn();
    let (status, _) = app.post("/api/users/search", None, json!({})).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn empty_criteria_returns_everything() -> Result<()> {
    let app = common::TestApp::spawn();
    let token = app.access_token();

    let (status, body) = app.post("/api/users/search", Some(&token), json!({})).await?;
    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["totalElements"], 4);
    assert_eq!(body["data"]["page"], 0);
    assert_eq!(body["data"]["pageSize"], 20);
    assert_eq!(body["data"]["first"], true);
    assert_eq!(body["data"]["last"], true);
    Ok(())
}

#[tokio::test]
async fn search_term_is_case_insensitive() -> Result<()> {
    let app = common::TestApp::spawn();
    let token = app.access_token();

    let (status, body) = app.post("/api/users/search", Some(&token), json!({ "searchTerm": "JOHN" })).await?;
    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);
    assert_eq!(names(&body, "fullName"), vec!["John Doe", "Johnny Shrestha"]);
    Ok(())
}

#[tokio::test]
async fn role_membership_returns_each_user_once() -> Result<()> {
    let app = common::TestApp::spawn();
    let token = app.access_token();

    let (status, body) = app
        .post("/api/users/search", Some(&token), json!({ "roles": ["EDITOR", "VIEWER"] }))
        .await?;
    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);
    assert_eq!(body["data"]["totalElements"], 2);
    assert_eq!(names(&body, "fullName"), vec!["John Doe", "Johnny Shrestha"]);
    Ok(())
}

#[tokio::test]
async fn inverted_ward_range_is_a_validation_error() -> Result<()> {
    let app = common::TestApp::spawn();
    let token = app.access_token();

    let (status, body) = app
        .post("/api/users/search", Some(&token), json!({ "wardNumberFrom": 3, "wardNumberTo": 1 }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["wardNumberFrom"].is_string(), "missing field error: {}", body);
    Ok(())
}

#[tokio::test]
async fn every_violation_is_reported() -> Result<()> {
    let app = common::TestApp::spawn();
    let token = app.access_token();

    let (status, body) = app
        .post("/api/users/search", Some(&token), json!({ "page": -1, "pageSize": 500, "wardNumber": 0 }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    for key in ["page", "pageSize", "wardNumber"] {
        assert!(body["field_errors"][key].is_string(), "missing {} in {}", key, body);
    }
    Ok(())
}

#[tokio::test]
async fn unknown_field_is_rejected() -> Result<()> {
    let app = common::TestApp::spawn();
    let token = app.access_token();

    let (status, body) = app
        .post("/api/users/search", Some(&token), json!({ "fields": ["fullName", "shoeSize"] }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "UNKNOWN_FIELD");
    assert!(body["error"].as_str().unwrap_or_default().contains("shoeSize"));
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_rejected() -> Result<()> {
    let app = common::TestApp::spawn();
    let token = app.access_token();

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/users/search")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{\"searchTerm\": "))?;
    let response = tower::ServiceExt::oneshot(app.router.clone(), request).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn projection_omits_absent_values() -> Result<()> {
    let app = common::TestApp::spawn();
    let token = app.access_token();

    let (status, body) = app
        .post(
            "/api/users/search",
            Some(&token),
            json!({ "searchTerm": "ram", "fields": ["fullName", "wardNumber", "phoneNumber"] }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);
    let rows = content(&body);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0], json!({ "fullName": "Ram Thapa" }));
    Ok(())
}

#[tokio::test]
async fn sorts_and_pages_wards() -> Result<()> {
    let app = common::TestApp::spawn();
    let token = app.access_token();

    let (status, body) = app
        .post(
            "/api/wards/search",
            Some(&token),
            json!({ "sortBy": "population", "sortDirection": "DESC", "page": 0, "pageSize": 2, "fields": ["wardNumber"] }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);
    assert_eq!(body["data"]["content"], json!([{ "wardNumber": 3 }, { "wardNumber": 2 }]));
    assert_eq!(body["data"]["totalPages"], 2);
    assert_eq!(body["data"]["last"], false);
    Ok(())
}

#[tokio::test]
async fn radius_search_finds_nearby_families() -> Result<()> {
    let app = common::TestApp::spawn();
    let token = app.access_token();

    let (status, body) = app
        .post(
            "/api/families/search",
            Some(&token),
            json!({ "latitude": 27.7, "longitude": 85.3, "radiusKm": 10 }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);
    assert_eq!(names(&body, "headOfFamily"), vec!["Hari Adhikari"]);

    let (status, body) = app.post("/api/families/search", Some(&token), json!({ "radiusKm": 10 })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["radiusKm"].is_string());
    Ok(())
}

#[tokio::test]
async fn field_catalogue_lists_wire_names() -> Result<()> {
    let app = common::TestApp::spawn();
    let token = app.access_token();

    let (status, body) = app.get("/api/municipalities/fields", Some(&token)).await?;
    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);
    assert_eq!(body["data"]["entity"], "municipalities");
    let detail = body["data"]["detail"].as_array().cloned().unwrap_or_default();
    assert!(detail.contains(&json!("wardCount")));
    assert!(body["data"]["audit"].as_array().map(|a| !a.is_empty()).unwrap_or(false));
    Ok(())
}
