use log::LevelFilter;
use openapi_gen::{PluginRegistry, cli};

fn main() -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    match cli::verbosity(&matches) {
        0 => {}
        1 => {
            logger.filter_level(LevelFilter::Info);
        }
        _ => {
            logger.filter_level(LevelFilter::Debug);
        }
    }
    logger.init();

    let registry = PluginRegistry::from_env();
    log::info!("Discovered {} generator plugins", registry.len());

    cli::run(&matches, &registry)?;
    Ok(())
}
