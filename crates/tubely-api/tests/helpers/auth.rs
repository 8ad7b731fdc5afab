use chrono::Duration;
use tubely_api::auth::make_jwt;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-that-is-at-least-32-chars";

/// A fresh user id and a valid token for it.
pub struct TestUser {
    pub user_id: Uuid,
    pub token: String,
}

impl TestUser {
    pub fn new() -> Self {
        let user_id = Uuid::new_v4();
        let token = make_jwt(user_id, TEST_JWT_SECRET, Duration::hours(1)).unwrap();
        Self { user_id, token }
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}
