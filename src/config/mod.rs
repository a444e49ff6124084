mod settings;

use crate::broker::KeyDeriver;
use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{BrokerSettings, LoggingSettings, Settings, TopicSettings};

/// Prefix of environment overrides, e.g. `TOPICWIRE__BROKER__CHANNEL_CAPACITY`.
pub const ENV_PREFIX: &str = "TOPICWIRE";

const DEFAULT_CONFIG_FILE: &str = "config/default";

/// Loads the configuration from `config/default` and environment variables.
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from(DEFAULT_CONFIG_FILE)
}

/// Loads the configuration from the optional file `path` (any format the
/// `config` crate recognises by extension) and environment variables, then
/// merges the result over `Settings::default()`.
pub fn load_config_from(path: &str) -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    let default = Settings::default();

    let separator = match partial.topic.as_ref().and_then(|t| t.separator.as_deref()) {
        Some(raw) => parse_separator(raw)?,
        None => default.topic.separator,
    };

    Ok(Settings {
        broker: BrokerSettings {
            channel_capacity: partial
                .broker
                .as_ref()
                .and_then(|b| b.channel_capacity)
                .unwrap_or(default.broker.channel_capacity),
        },
        topic: TopicSettings { separator },
        logging: LoggingSettings {
            level: partial
                .logging
                .as_ref()
                .and_then(|l| l.level.clone())
                .unwrap_or(default.logging.level),
        },
    })
}

fn parse_separator(raw: &str) -> Result<char, ConfigError> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => KeyDeriver::new(c)
            .map(|d| d.separator())
            .map_err(|e| ConfigError::Message(format!("topic.separator: {e}"))),
        _ => Err(ConfigError::Message(format!(
            "topic.separator must be a single character, got '{raw}'"
        ))),
    }
}

#[cfg(test)]
mod tests;
