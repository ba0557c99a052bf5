//! Seeds a demo account and prints a bearer token for it
//!
//! Creates `teste@example.com` with password `password`, or resets the name
//! and password if the account already exists, then issues a new token named
//! `token-de-teste`.
//!
//! ```bash
//! cargo run -p tasklist-api --bin seed-demo-user
//! ```

use tasklist_api::{
    app::{connect_store, AppState},
    config::Config,
    telemetry,
};
use tasklist_shared::{
    auth::password::hash_password, db::pool::close_pool, models::user::CreateUser, store::UserStore,
};

const DEMO_NAME: &str = "Demo User";
const DEMO_EMAIL: &str = "teste@example.com";
const DEMO_PASSWORD: &str = "password";
const DEMO_TOKEN_NAME: &str = "token-de-teste";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    telemetry::init(config.logging.format)?;

    if config.uses_memory_store() {
        tracing::warn!("DATABASE_URL is memory://; the seeded user disappears when this process exits");
    }

    let (store, pool) = connect_store(&config).await?;
    let state = AppState::new(store, config);

    let user = state
        .store
        .upsert_user(CreateUser {
            name: DEMO_NAME.to_string(),
            email: DEMO_EMAIL.to_string(),
            password_hash: hash_password(DEMO_PASSWORD)?,
        })
        .await?;

    let issued = state
        .issuer
        .issue(state.store.as_ref(), &user, DEMO_TOKEN_NAME)
        .await?;

    tracing::info!(user_id = %user.id, token_id = %issued.token.id, "Demo user seeded");

    println!("email:    {}", DEMO_EMAIL);
    println!("password: {}", DEMO_PASSWORD);
    println!("token:    {}", issued.plaintext);

    if let Some(pool) = pool {
        close_pool(pool).await;
    }

    Ok(())
}
