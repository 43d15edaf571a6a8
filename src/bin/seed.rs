//! Seed the database with a super admin account and starter categories.
//!
//! Usage: cargo run --bin seed
//! The admin password defaults to "admin12345"; override with SEED_ADMIN_PASSWORD.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use sqlx::postgres::PgPoolOptions;

use equiptrack_server::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().expect("Failed to load configuration");

    tracing_subscriber::fmt().init();

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database.url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let email = std::env::var("SEED_ADMIN_EMAIL")
        .unwrap_or_else(|_| "admin@equiptrack.local".to_string());
    let password =
        std::env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| "admin12345".to_string());

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();

    sqlx::query(
        r#"
        INSERT INTO users (name, email, password, role_id, is_active)
        VALUES ('System Administrator', $1, $2,
                (SELECT id FROM roles WHERE name = 'super_admin'), TRUE)
        ON CONFLICT (email) DO UPDATE SET password = EXCLUDED.password
        "#,
    )
    .bind(&email)
    .bind(&hash)
    .execute(&pool)
    .await?;

    for name in ["Laptop", "Monitor", "Keyboard", "Mouse", "Headset"] {
        sqlx::query("INSERT INTO categories (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .execute(&pool)
            .await?;
    }

    tracing::info!(email = %email, "Seeded super admin account");
    Ok(())
}
