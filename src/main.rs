use map_tiler::{Settings, logging, run};

fn main() {
    logging::setup_logging();
    let settings = Settings::from_cli();

    let output = run(&settings).and_then(|summary| Ok(summary.to_json(settings.pretty)?));
    match output {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    }
}
