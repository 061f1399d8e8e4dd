use anyhow::Context;
use bookshop_app::modules;
use bookshop_kernel::settings::Settings;
use bookshop_kernel::{InitCtx, ModuleRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookshop settings")?;

    bookshop_telemetry::init(&settings.telemetry);

    tracing::info!(
        env = ?settings.environment,
        "bookshop-app bootstrap starting"
    );

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, &settings);

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    tracing::info!("bookshop-app bootstrap complete");

    bookshop_http::start_server(&registry, &settings).await?;

    registry.stop_all().await?;

    Ok(())
}
