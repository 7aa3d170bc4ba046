// Matcha launcher binary
//
// Loads configuration, bootstraps the app registry and serves the shell
// until Ctrl-C.

use matcha::services::ConfigService;
use matcha::shell::Server;
use matcha::version;
use matcha::LauncherBuilder;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    tracing::info!("Starting {}", version::full_version_info());

    let deps = LauncherBuilder::new().with_production_deps()?.build()?;
    let bind_addr = deps.config.get_bind_addr();

    let (api, report) = deps.bootstrap().await?;
    if !report.is_clean() {
        for (origin, reason) in &report.failed {
            tracing::warn!("Skipped app source {}: {}", origin, reason);
        }
    }
    if report.loaded.is_empty() {
        tracing::warn!("No apps loaded; the store will be empty");
    }

    let mut server = Server::start(Arc::new(api), bind_addr).await?;
    println!("Matcha is running at http://{}", server.addr());

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    server.shutdown()?;
    server.stopped().await;

    Ok(())
}
