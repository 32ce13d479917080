//!
//! Documentation of the config module.
//! Sets up the 'config' and 'logger'.
//!



extern crate confy;

use serde::{Serialize, Deserialize};
use std::default::Default;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConfyConfig {
    pub print_log: bool,
    pub log_file: String,
    pub database: String,
    pub database_ip: String,
    pub timeout: u64,
    pub token_secret: String,
    pub token_days: i64,
    pub stripe_secret_key: String,
    pub stripe_api_url: String,
    pub mail_relay_url: String,
    pub mail_sender: String,
}

///Config check
impl Default for ConfyConfig {
    fn default() -> Self {
        ConfyConfig {
            print_log: false,
            log_file: "output.log".to_string(),
            database: "vehiQuest".to_string(),
            database_ip: "mongodb://localhost:27017/".to_string(),
            timeout: 2,
            token_secret: "vehiquest-dev-secret".to_string(),
            token_days: 365,
            stripe_secret_key: "".to_string(),
            stripe_api_url: "https://api.stripe.com/v1".to_string(),
            mail_relay_url: "".to_string(),
            mail_sender: "noreply@vehiquest.app".to_string(),
        }
    }
}

/// Initialize config and load
pub async fn init() -> Result<ConfyConfig, confy::ConfyError> {
    let cfg: ConfyConfig = confy::load_path("vehiquest.toml").unwrap_or_default();
    Ok(cfg)
}

/// Sets up logger
pub async fn setup_logger(file: &ConfyConfig) -> Result<(), fern::InitError> {
    if file.print_log {
        fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(log::LevelFilter::Debug)
        .chain(std::io::stdout())
        .chain(fern::log_file(&file.log_file)?)
        .apply()?;
    }

    else {
        fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(log::LevelFilter::Debug)
        .chain(fern::log_file(&file.log_file)?)
        .apply()?;
    }

    Ok(())
}
