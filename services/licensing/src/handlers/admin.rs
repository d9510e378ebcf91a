use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use zari_auth_types::identity::AdminIdentity;

use crate::domain::types::Admin;
use crate::error::LicensingServiceError;
use crate::state::AppState;
use crate::usecase::admin::{
    ListAdminsUseCase, LoginInput, LoginUseCase, RegisterAdminInput, RegisterAdminUseCase,
};

// ── POST /auth/login ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
    pub user: AdminResponse,
}

#[derive(Serialize)]
pub struct AdminResponse {
    pub username: String,
    pub is_admin: bool,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, LicensingServiceError> {
    let usecase = LoginUseCase {
        admins: state.admin_repo(),
        jwt_secret: state.jwt_secret.as_str().to_owned(),
        token_ttl_secs: state.access_token_ttl_secs,
    };
    let output = usecase
        .execute(LoginInput {
            username: body.username,
            password: body.password,
        })
        .await?;

    Ok(Json(LoginResponse {
        access_token: output.access_token,
        token_type: "Bearer",
        expires_in: output.expires_in,
        user: AdminResponse {
            username: output.username,
            is_admin: output.is_admin,
        },
    }))
}

// ── POST /auth/register ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Serialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub username: String,
    pub is_admin: bool,
    #[serde(serialize_with = "zari_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<Admin> for AccountResponse {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id,
            username: admin.username,
            is_admin: admin.is_admin,
            created_at: admin.created_at,
        }
    }
}

pub async fn register(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), LicensingServiceError> {
    let usecase = RegisterAdminUseCase {
        admins: state.admin_repo(),
        cost: state.bcrypt_cost,
    };
    let account = usecase
        .execute(RegisterAdminInput {
            username: body.username,
            password: body.password,
            is_admin: body.is_admin,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(account.into())))
}

// ── GET /auth/users ──────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct AccountListResponse {
    pub users: Vec<AccountResponse>,
    pub total: usize,
}

pub async fn list_users(
    _admin: AdminIdentity,
    State(state): State<AppState>,
) -> Result<Json<AccountListResponse>, LicensingServiceError> {
    let usecase = ListAdminsUseCase {
        admins: state.admin_repo(),
    };
    let users: Vec<AccountResponse> = usecase
        .execute()
        .await?
        .into_iter()
        .map(AccountResponse::from)
        .collect();
    Ok(Json(AccountListResponse {
        total: users.len(),
        users,
    }))
}
