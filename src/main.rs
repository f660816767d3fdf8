#[macro_use]
extern crate log;

use vmon_front::{Config, ConfigError};

use std::io;

fn main() {
    let (config, err) = match Config::load() {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(err)),
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    match err {
        Some(ConfigError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
            info!("no config file, using defaults");
        }
        Some(err) => error!("{err}, using defaults"),
        None => (),
    }

    vmon_front::run(config);
}
