//! Bearer-token helpers for integration tests.
//!
//! Admin routes require `Authorization: Bearer <jwt>`. `MockAdmin` signs a
//! token with the test secret so requests can be built without a login round-trip.

use http::{HeaderMap, HeaderValue, header::AUTHORIZATION};

use zari_auth_types::token::issue_access_token;

/// Secret shared by test routers and `MockAdmin`.
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-unit-tests-only";

/// Configurable identity encoded into a signed test token.
pub struct MockAdmin {
    pub username: String,
    pub is_admin: bool,
}

impl MockAdmin {
    pub fn new(username: &str, is_admin: bool) -> Self {
        Self {
            username: username.to_owned(),
            is_admin,
        }
    }

    pub fn admin() -> Self {
        Self::new("admin", true)
    }

    /// Signed bearer token for this identity (valid for one hour).
    pub fn token(&self) -> String {
        issue_access_token(&self.username, self.is_admin, TEST_JWT_SECRET, 3600)
            .expect("sign test token")
            .0
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token())
    }

    /// Headers as a client would send them.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&self.bearer()).expect("valid header value"),
        );
        map
    }
}
