use relm4::prelude::*;
use tally::config;
use tally::gui::app::AppModel;
use tally::sys::runtime;
use tally::viewmodel::DonutChartViewModel;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    match config::write_default_config() {
        Ok(path) => log::debug!("Using config file {}", path.display()),
        Err(e) => log::warn!("Could not create default config: {}", e),
    }

    let config = config::load_or_default();
    let chart = DonutChartViewModel::new(&config.chart, &config.animation)?;

    let (tx, rx) = async_channel::bounded(32);

    // Start Background Services
    let commands = runtime::start_background_services(&config, tx);

    let app = RelmApp::new("org.tally.Tally");

    app.run::<AppModel>((chart, rx, commands));
    Ok(())
}
