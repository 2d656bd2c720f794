use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use food_delivery_api::analytics::OrderAnalytics;
use food_delivery_api::config::Config;
use food_delivery_api::db;
use food_delivery_api::error::AppResult;
use food_delivery_api::models::{CreateUser, Role, User};
use food_delivery_api::routes::{create_router, AppState};
use food_delivery_api::services::{hash_password, EmailService, TokenService};
use food_delivery_api::storage::{LocalStorage, R2Storage, StorageBackend};

/// Creates the admin account from `ADMIN_EMAIL`/`ADMIN_PASSWORD` on first start.
async fn bootstrap_admin(conn: &libsql::Connection, config: &Config) -> AppResult<()> {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return Ok(());
    };
    let email = email.trim().to_lowercase();

    if User::find_by_email(conn, &email).await?.is_some() {
        return Ok(());
    }

    let admin = User::create(
        conn,
        CreateUser {
            name: Some("Admin".to_string()),
            email,
            password_hash: hash_password(password)?,
            role: Role::Admin,
            phone: None,
            is_approved: true,
        },
    )
    .await?;

    tracing::info!("Created admin account {}", admin.email);
    Ok(())
}

async fn local_storage(config: &Config) -> Result<Arc<dyn StorageBackend>, Box<dyn std::error::Error>> {
    let local = LocalStorage::new(&config.upload_dir, &config.base_url);
    local.ensure_dir().await?;
    Ok(Arc::new(local))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "food_delivery_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    let db = db::create_database(&config.database_url, config.turso_auth_token.as_deref()).await?;
    let conn = db.connect()?;
    db::migrate(&conn).await?;
    tracing::info!("Connected to database");

    bootstrap_admin(&conn, &config).await?;

    let email = match &config.smtp {
        Some(smtp) => match EmailService::new(&smtp.host, &smtp.user, &smtp.pass, &config.from_email) {
            Ok(service) => {
                tracing::info!("Email service initialized");
                Some(service)
            }
            Err(e) => {
                tracing::warn!("Email service not available: {}", e);
                None
            }
        },
        None => {
            tracing::warn!("SMTP not configured - OTP codes will only be logged");
            None
        }
    };

    let storage: Arc<dyn StorageBackend> = match (config.storage_type.as_str(), &config.r2) {
        ("r2", Some(r2)) => {
            tracing::info!("Using R2 storage");
            Arc::new(R2Storage::new(r2)?)
        }
        ("r2", None) => {
            tracing::warn!("R2 storage configured but missing credentials, falling back to local");
            local_storage(&config).await?
        }
        _ => {
            tracing::info!("Using local storage");
            local_storage(&config).await?
        }
    };

    tracing::info!("Analytics timezone: {}", config.analytics_timezone);

    let state = AppState {
        db: Arc::new(db),
        tokens: TokenService::new(&config.jwt_secret, config.jwt_ttl_hours),
        analytics: OrderAnalytics::new(config.analytics_timezone),
        email,
        storage,
        config: config.clone(),
    };

    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
