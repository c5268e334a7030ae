//! Config schema types (server, store, channel, directory, matching, reply).

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadlineConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub channel: ChannelConfig,
    pub directory: DirectoryConfig,
    pub matching: MatchingConfig,
    pub reply: ReplyConfig,
}

/// Gateway server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to. Defaults to "127.0.0.1".
    pub bind: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

/// Session store (redis) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Redis connection url. Supports `${ENV_VAR}` substitution for
    /// credentials, e.g. `redis://:${REDIS_PASSWORD}@10.0.0.5:6379`.
    pub url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".into(),
        }
    }
}

/// Chat sidecar configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// WebSocket url of the chat sidecar process.
    pub sidecar_url: String,
    /// Phone number the bot answers from. Used to build wa.me links, so it
    /// should be the full international number ("+2348012345678" or bare
    /// digits both work).
    pub bot_phone: String,
    /// How many times to retry the initial sidecar connection before
    /// giving up. One second between attempts.
    pub connect_attempts: u32,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            sidecar_url: "ws://127.0.0.1:8765".into(),
            bot_phone: String::new(),
            connect_attempts: 10,
        }
    }
}

/// Company profile sheet configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Spreadsheet id from the sheet url.
    pub sheet_id: String,
    /// Tab and cell range holding the profile table.
    pub range: String,
    /// API key with read access to the sheet.
    pub api_key: String,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            sheet_id: String::new(),
            range: "Helsinki!A:Z".into(),
            api_key: String::new(),
        }
    }
}

/// Inbound message matching configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Country calling code prepended when normalizing local phone numbers.
    pub country_code: String,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            country_code: "234".into(),
        }
    }
}

/// Reply pacing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyConfig {
    /// Delay between the bridge message and the profile follow-up, in seconds.
    pub response_delay_secs: u64,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            response_delay_secs: 30,
        }
    }
}
