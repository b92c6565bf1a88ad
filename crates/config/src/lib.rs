//! Configuration loading for lockstash.
//!
//! Config file: `lockstash.toml`, searched in `./` then `~/.config/lockstash/`.
//! Supports `${ENV_VAR}` substitution in the raw file before parsing, which is
//! how the master key material is normally injected.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{config_dir, discover_and_load, load_config},
    schema::{AuthConfig, DatabaseConfig, EncryptionConfig, KdfParams, LockstashConfig},
};
