use sea_orm::Database;
use tracing::info;

use zari_auth_types::identity::JwtSecret;
use zari_core::config::Config;
use zari_core::tracing::init_tracing;

use zari_licensing::config::LicensingConfig;
use zari_licensing::router::build_router;
use zari_licensing::state::AppState;
use zari_licensing::usecase::admin::SeedAdminUseCase;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = LicensingConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let state = AppState {
        db,
        jwt_secret: JwtSecret::new(config.jwt_secret.as_str()),
        access_token_ttl_secs: config.access_token_ttl_secs,
        max_upload_bytes: config.max_upload_bytes,
        bcrypt_cost: config.bcrypt_cost,
    };

    if let Some(password) = config.admin_password.as_deref() {
        let seeder = SeedAdminUseCase {
            admins: state.admin_repo(),
            cost: config.bcrypt_cost,
        };
        seeder
            .execute(&config.admin_username, password)
            .await
            .expect("failed to seed initial admin");
    }

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.licensing_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("licensing service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
