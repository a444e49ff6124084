use serde::Deserialize;

use crate::broker::{BrokerConfig, KeyDeriver, topic::DEFAULT_SEPARATOR};

/// Top-level configuration settings for the application.
///
/// Includes settings for the broker, topic key derivation and logging.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub broker: BrokerSettings,
    pub topic: TopicSettings,
    pub logging: LoggingSettings,
}

/// Configuration settings for the broker.
///
/// `channel_capacity` bounds each subscription's buffer; `0` disables the bound.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokerSettings {
    pub channel_capacity: usize,
}

/// Separator used to join topic key components. Already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicSettings {
    pub separator: char,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Missing values are filled from `Settings::default()`.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub broker: Option<PartialBrokerSettings>,
    pub topic: Option<PartialTopicSettings>,
    pub logging: Option<PartialLoggingSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialBrokerSettings {
    pub channel_capacity: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PartialTopicSettings {
    pub separator: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            broker: BrokerSettings {
                channel_capacity: BrokerConfig::DEFAULT_CHANNEL_CAPACITY,
            },
            topic: TopicSettings {
                separator: DEFAULT_SEPARATOR,
            },
            logging: LoggingSettings {
                level: "info".to_string(),
            },
        }
    }
}

impl Settings {
    pub fn broker_config(&self) -> BrokerConfig {
        BrokerConfig {
            channel_capacity: self.broker.channel_capacity,
        }
    }

    /// The separator is checked in `load_config`, so this only fails for
    /// hand-built settings.
    pub fn key_deriver(&self) -> Result<KeyDeriver, crate::utils::error::TopicError> {
        KeyDeriver::new(self.topic.separator)
    }
}
