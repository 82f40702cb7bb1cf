#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use dpms_api::app::{app, AppState, Stores};
use dpms_api::auth::{InMemoryRevocationStore, TokenService, TokenSubject};
use dpms_api::database::models::{HouseOwnership, OfficePost, RoleType, User, Family, Ward};
use dpms_api::database::MemoryStore;
use dpms_api::services::SearchService;

pub const SECRET: &str = "integration-test-secret";
pub const STORE_TIMEOUT: Duration = Duration::from_millis(500);

pub struct TestApp {
    pub router: Router,
    pub tokens: Arc<TokenService>,
}

impl TestApp {
    /// Router over seeded in-memory stores.
    pub fn spawn() -> Self {
        let tokens = Arc::new(token_service());
        let mut stores = Stores::in_memory();
        stores.users = Arc::new(MemoryStore::new(seed_users()));
        stores.families = Arc::new(MemoryStore::new(seed_families()));
        stores.wards = Arc::new(MemoryStore::new(seed_wards()));

        let state = AppState::new(tokens.clone(), stores, SearchService::new(20), Duration::from_secs(2), STORE_TIMEOUT);
        Self { router: app(state, CorsLayer::new()), tokens }
    }

    pub fn subject(&self) -> TokenSubject {
        TokenSubject { user_id: Uuid::new_v4(), email: "admin@dpms.gov.np".to_string(), roles: vec![RoleType::Admin] }
    }

    pub fn access_token(&self) -> String {
        self.tokens.issue_access(&self.subject()).expect("issue access token")
    }

    pub async fn send(&self, method: Method, path: &str, token: Option<&str>, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let payload = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
        Ok((status, payload))
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, path, token, None).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::POST, path, token, Some(body)).await
    }
}

pub fn token_service() -> TokenService {
    TokenService::new(
        SECRET,
        chrono::Duration::minutes(15),
        chrono::Duration::hours(24),
        Arc::new(InMemoryRevocationStore::new()),
    )
    .expect("token service")
}

fn user(name: &str, roles: Vec<RoleType>, ward_number: Option<i32>) -> User {
    User {
        id: Uuid::new_v4(),
        email: format!("{}@dpms.gov.np", name.split_whitespace().next().unwrap_or(name).to_lowercase()),
        full_name: name.to_string(),
        full_name_nepali: None,
        phone_number: None,
        roles,
        office_post: Some(OfficePost::WardSecretary),
        ward_number,
        is_approved: true,
        approved_by: None,
        approved_at: None,
        is_active: true,
        profile_picture: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn seed_users() -> Vec<User> {
    vec![
        user("John Doe", vec![RoleType::Editor, RoleType::Viewer], Some(1)),
        user("Johnny Shrestha", vec![RoleType::Viewer], Some(2)),
        user("Sita Sharma", vec![RoleType::Admin], Some(3)),
        user("Ram Thapa", vec![], None),
    ]
}

pub fn seed_families() -> Vec<Family> {
    let family = |head: &str, members: i32, lat: f64, lng: f64| Family {
        id: Uuid::new_v4(),
        head_of_family: head.to_string(),
        head_of_family_nepali: None,
        contact_number: None,
        ward_number: 1,
        tole: Some("Baneshwor".to_string()),
        total_members: members,
        house_ownership: HouseOwnership::Owned,
        latitude: Some(lat),
        longitude: Some(lng),
        photo_url: None,
        created_by: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    vec![
        // Kathmandu
        family("Hari Adhikari", 5, 27.7172, 85.3240),
        // Pokhara
        family("Gita Gurung", 3, 28.2096, 83.9856),
    ]
}

pub fn seed_wards() -> Vec<Ward> {
    let municipality_id = Uuid::new_v4();
    (1..=3)
        .map(|number| Ward {
            id: Uuid::new_v4(),
            municipality_id,
            ward_number: number,
            area_sq_km: Some(2.5 * number as f64),
            population: Some(1_000 * number as i64),
            latitude: None,
            longitude: None,
            office_address: Some(format!("Ward {} office", number)),
            contact_number: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
        .collect()
}
