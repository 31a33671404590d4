use gesture_panel::app::App;
use gesture_panel::config::PanelConfig;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    tracing_subscriber::fmt::init();
    color_eyre::install()?;
    let config = PanelConfig::load()?;
    let terminal = ratatui::init();
    let result = App::new(config)?.run(terminal).await;
    ratatui::restore();
    result
}
