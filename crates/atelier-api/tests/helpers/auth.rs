use atelier_api::auth::{JwtService, UserRole};
use uuid::Uuid;

use super::TEST_JWT_SECRET;

/// A signed-in caller.
pub struct TestUser {
    pub user_id: Uuid,
    pub role: UserRole,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

fn issue(user_id: Uuid, role: UserRole) -> TestUser {
    let token = JwtService::new(TEST_JWT_SECRET, 1)
        .issue(user_id, role)
        .expect("Failed to issue test token");
    TestUser {
        user_id,
        role,
        token,
    }
}

pub fn member() -> TestUser {
    issue(Uuid::new_v4(), UserRole::Member)
}

pub fn admin() -> TestUser {
    issue(Uuid::new_v4(), UserRole::Admin)
}

/// Token signed with a different secret.
pub fn forged_token() -> String {
    JwtService::new("some-other-secret-that-is-also-32-chars-long", 1)
        .issue(Uuid::new_v4(), UserRole::Admin)
        .expect("Failed to issue forged token")
}
