mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let app = common::TestApp::spawn();
    let (status, body) = app.get("/health", None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_bearer_token() -> Result<()> {
    let app = common::TestApp::spawn();

    let (status, body) = app.get("/api/auth/whoami", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = app.get("/api/auth/whoami", Some("not-a-jwt")).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn whoami_returns_token_identity() -> Result<()> {
    let app = common::TestApp::spawn();
    let token = app.access_token();

    let (status, body) = app.get("/api/auth/whoami", Some(&token)).await?;
    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);
    assert_eq!(body["data"]["email"], "admin@dpms.gov.np");
    assert_eq!(body["data"]["roles"], json!(["ADMIN"]));
    Ok(())
}

#[tokio::test]
async fn refresh_token_is_not_an_access_token() -> Result<()> {
    let app = common::TestApp::spawn();
    let refresh = app.tokens.issue_refresh(&app.subject())?;

    let (status, _) = app.get("/api/auth/whoami", Some(&refresh)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn logout_revokes_access_and_refresh_tokens() -> Result<()> {
    let app = common::TestApp::spawn();
    let pair = app.tokens.issue_pair(&app.subject())?;

    let (status, body) = app
        .post("/api/auth/logout", Some(&pair.access_token), json!({ "refreshToken": pair.refresh_token }))
        .await?;
    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);

    let (status, body) = app.get("/api/auth/whoami", Some(&pair.access_token)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Token revoked");

    let (status, _) = app.post("/auth/refresh", None, json!({ "refreshToken": pair.refresh_token })).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn logout_without_body_revokes_access_token() -> Result<()> {
    let app = common::TestApp::spawn();
    let token = app.access_token();

    let (status, _) = app.send(axum::http::Method::POST, "/api/auth/logout", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(!app.tokens.validate(&token, common::STORE_TIMEOUT).await);
    Ok(())
}

#[tokio::test]
async fn refresh_rotates_the_pair() -> Result<()> {
    let app = common::TestApp::spawn();
    let pair = app.tokens.issue_pair(&app.subject())?;

    let (status, body) = app.post("/auth/refresh", None, json!({ "refreshToken": pair.refresh_token })).await?;
    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);
    assert_eq!(body["data"]["tokenType"], "Bearer");
    assert_eq!(body["data"]["expiresIn"], 900);

    let access = body["data"]["accessToken"].as_str().unwrap_or_default().to_string();
    let (status, _) = app.get("/api/auth/whoami", Some(&access)).await?;
    assert_eq!(status, StatusCode::OK);

    // The old refresh token cannot be replayed
    let (status, _) = app.post("/auth/refresh", None, json!({ "refreshToken": pair.refresh_token })).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn refresh_rejects_access_tokens_and_bad_bodies() -> Result<()> {
    let app = common::TestApp::spawn();
    let access = app.access_token();

    let (status, _) = app.post("/auth/refresh", None, json!({ "refreshToken": access })).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.post("/auth/refresh", None, json!({})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn concurrent_refreshes_issue_one_pair() -> Result<()> {
    let app = common::TestApp::spawn();
    let pair = app.tokens.issue_pair(&app.subject())?;
    let body = json!({ "refreshToken": pair.refresh_token });

    let (first, second) = tokio::join!(
        app.post("/auth/refresh", None, body.clone()),
        app.post("/auth/refresh", None, body.clone())
    );
    let mut statuses = vec![first?.0, second?.0];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::UNAUTHORIZED]);
    Ok(())
}
