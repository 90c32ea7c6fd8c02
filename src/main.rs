use clap::Parser;
use lms_backend_lib::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    lms_backend_lib::run(config).await
}
