use finance_tui::{app, config, error::Result, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;
    logging::init(&config)?;
    tracing::info!("starting against {}", config.base_url);

    let mut app = app::App::new(config)?;
    app.run().await?;
    Ok(())
}
