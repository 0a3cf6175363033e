use clap::Parser;
use color_eyre::eyre::Report;
use comment_box::Settings;

#[tokio::main]
async fn main() -> Result<(), Report> {
    let settings = Settings::parse();
    settings.telemetry().install()?;
    comment_box::run(settings).await
}
