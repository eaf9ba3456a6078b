use drillreport::configuration::get_configuration;
use drillreport::startup::run;
use drillreport::telemetry::{get_subscriber, init_subscriber};
use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Read in configuration
    let configuration = get_configuration().expect("Failed to read configuration.");

    // Set up logging
    let subscriber = get_subscriber(
        "drillreport".into(),
        configuration.log_level,
        std::io::stdout,
    );
    init_subscriber(subscriber);

    // Create a connection pool for the PostgreSQL database
    let connection_pool = PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(2))
        .connect_lazy_with(configuration.database.with_db());

    // Create a TcpListener for a given address and port
    let address = format!(
        "{}:{}",
        configuration.application.addr, configuration.application.port
    );
    let listener = TcpListener::bind(address)?;

    // Start server
    run(listener, connection_pool)?.await?;

    Ok(())
}
