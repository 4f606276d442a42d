#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! File-backed configuration for the Coolify CLI.
//!
//! Layout: `model.rs` (instances and resolution rules), `store.rs` (locating,
//! loading and saving the JSON document), `error.rs` (typed failures).

pub mod error;
pub mod model;
pub mod store;

pub use error::{ConfigError, ConfigResult};
pub use model::{CliConfig, Instance, InstanceSelector, ResolvedInstance};
pub use store::{CONFIG_ENV_VAR, ConfigStore, default_config_path};
