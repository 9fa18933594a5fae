use anyhow::Context;

use catalog_infra::Settings;
use catalog_observability::LogSettings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    catalog_observability::init(&LogSettings::from_env()?);

    let settings = Settings::from_env()?;
    let app = catalog_api::app::build_app(&settings).await?;

    let listener = tokio::net::TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_addr))?;

    tracing::info!(
        service = %settings.service_name,
        addr = %listener.local_addr()?,
        "listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
