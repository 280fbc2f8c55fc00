pub mod event;
pub mod grpc;
pub mod job;
pub mod log;

pub mod context;
pub use context::Context;

pub mod provider;
pub use provider::Provider;

use std::env;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use derive_more::{Deref, From};
use displaydoc::Display;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

const CONFIG_FILE_ENV: &str = "CONFIG_FILE";
const CONFIG_FILE_DEFAULT: &str = "config.toml";

#[derive(Debug, Display, Error)]
pub enum Error {
    /// Failed to parse event Config: {0}
    Event(event::Error),
    /// Failed to parse gRPC Config: {0}
    Grpc(grpc::Error),
    /// Failed to parse HumanTime: {0}
    HumanTime(serde_json::Error),
    /// Failed to parse job Config: {0}
    Job(job::Error),
    /// Failed to parse Log Config: {0}
    Log(log::Error),
    /// No config file at path: {0}
    NoConfigFile(String),
    /// Failed to create Provider: {0}
    Provider(provider::Error),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub event: Arc<event::Config>,
    pub grpc: Arc<grpc::Config>,
    pub job: Arc<job::Config>,
    pub log: Arc<log::Config>,
}

impl Config {
    /// Read the config from `CONFIG_FILE` if set, otherwise from `config.toml`
    /// when it exists, layered under secrets and environment variables.
    pub fn new() -> Result<Self, Error> {
        let provider = if let Ok(file) = env::var(CONFIG_FILE_ENV) {
            let path = Path::new(&file);
            if path.exists() {
                Provider::new(Some(path)).map_err(Error::Provider)
            } else {
                Err(Error::NoConfigFile(file))
            }
        } else {
            let path = Path::new(CONFIG_FILE_DEFAULT);
            let toml = path.exists().then_some(path);
            Provider::new(toml).map_err(Error::Provider)
        }?;

        TryInto::try_into(&provider)
    }

    pub fn from_toml<P: AsRef<Path>>(toml: P) -> Result<Self, Error> {
        let provider = Provider::new(Some(toml)).map_err(Error::Provider)?;
        TryInto::try_into(&provider)
    }

    pub fn from_default_toml() -> Result<Self, Error> {
        env::var(CONFIG_FILE_ENV)
            .map_or_else(|_| Self::from_toml(CONFIG_FILE_DEFAULT), Self::from_toml)
    }
}

impl TryFrom<&Provider> for Config {
    type Error = Error;

    fn try_from(provider: &Provider) -> Result<Self, Self::Error> {
        let event = event::Config::try_from(provider)
            .map(Arc::new)
            .map_err(Error::Event)?;
        let grpc = grpc::Config::try_from(provider)
            .map(Arc::new)
            .map_err(Error::Grpc)?;
        let job = job::Config::try_from(provider)
            .map(Arc::new)
            .map_err(Error::Job)?;
        let log = log::Config::try_from(provider)
            .map(Arc::new)
            .map_err(Error::Log)?;

        Ok(Config {
            event,
            grpc,
            job,
            log,
        })
    }
}

/// Convenience wrapper around a `Duration` for easier parsing.
#[derive(Clone, Copy, Debug, Deref, Deserialize, From)]
pub struct HumanTime(#[serde(with = "humantime_serde")] Duration);

impl FromStr for HumanTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(Value::String(s.into())).map_err(Error::HumanTime)
    }
}
