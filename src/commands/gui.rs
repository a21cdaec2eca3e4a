use lifcore::core::config::CoreConfig;

use crate::gui::app::App;

pub fn run(config: CoreConfig) -> anyhow::Result<()> {
    eframe::run_native(
        "LIF Core",
        eframe::NativeOptions::default(),
        Box::new(|cc| Ok(Box::new(App::new(cc, config)))),
    )
    .map_err(|err| anyhow::anyhow!("viewer failed: {err}"))
}
