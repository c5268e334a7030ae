//! Configuration loading and env substitution.
//!
//! Config file: `leadline.toml`, searched in `./` then `~/.config/leadline/`.
//! Every section has working defaults, so running without a file is fine for
//! local development. Supports `${ENV_VAR}` substitution in the raw file,
//! which is how secrets (store url, sheet API key) stay out of the config.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{discover_and_load, load_config},
    schema::{
        ChannelConfig, DirectoryConfig, LeadlineConfig, MatchingConfig, ReplyConfig, ServerConfig,
        StoreConfig,
    },
};
