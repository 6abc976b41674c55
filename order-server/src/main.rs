use order_server::utils::logger::{init_logger, init_logger_with_file};
use order_server::{Config, Server, ServerState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let config = Config::from_env();

    // Production logs also roll to disk; everything else stays on stdout.
    if config.is_production() {
        std::fs::create_dir_all("logs").ok();
        init_logger_with_file(None, Some("logs"));
    } else {
        init_logger();
    }

    tracing::info!(
        environment = %config.environment,
        port = config.http_port,
        "Pétala Order Hub starting..."
    );

    let state = ServerState::initialize(config).await?;
    let server = Server::new(state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {e}");
        return Err(e.into());
    }
    Ok(())
}
