use config::{Config, ConfigError, Environment, File};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

lazy_static! {
    pub static ref SETTINGS: Settings = Settings::new().expect("invalid configuration");
}

const SETTINGS_PATH: &str = "./spacetime-proofs.config.toml";
const PREFIX: &str = "SPACETIME_PROOFS";

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Rebuild a replica's tree root from its data before generating a vanilla proof.
    pub verify_cache: bool,
    /// Threads used to produce partition proofs.
    pub window_post_synthesis_num_cpus: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            verify_cache: false,
            window_post_synthesis_num_cpus: num_cpus::get() as u32,
        }
    }
}

impl Settings {
    fn new() -> Result<Settings, ConfigError> {
        Config::builder()
            .add_source(File::with_name(SETTINGS_PATH).required(false))
            .add_source(Environment::with_prefix(PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
