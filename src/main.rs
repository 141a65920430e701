use std::{path::Path, sync::Arc};

use taskhub::{
    app, config::AppConfig, migrate, state::AppState, storage::PgStorage, telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    telemetry::init(&config.env);
    tracing::info!(env = %config.env, "starting taskhub");

    let pool = PgStorage::connect(&config.database).await?;

    migrate::run(
        &pool,
        Path::new(&config.migrations.dir),
        config.migrations.mode,
    )
    .await?;

    let addr = config.http.address();
    let state = AppState::new(Arc::new(PgStorage::new(pool)), config);
    app::serve(app::build_app(state), &addr).await
}
