use clap::Parser;

use sheetplay::config::Config;

fn main() {
    env_logger::init();
    log::info!("sheetplay starting up");

    let config = Config::parse();
    if let Err(e) = sheetplay::run(config) {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
