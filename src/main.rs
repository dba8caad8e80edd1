use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let settings = fx_api::config::Settings::from_env()?;
    tracing::info!("Настройки прочитаны");
    fx_api::run(settings).await?;
    Ok(())
}
