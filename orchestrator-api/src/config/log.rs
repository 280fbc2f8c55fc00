use displaydoc::Display;
use strum::EnumString;
use thiserror::Error;
use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use super::provider::{self, Provider};

const SERVICE_NAME_DEV: &str = "orchestrator-api-dev";
const SERVICE_NAME_STAGING: &str = "orchestrator-api-staging";
const SERVICE_NAME_PRODUCTION: &str = "orchestrator-api-production";

const LOG_ENVIRONMENT_VAR: &str = "LOG_ENVIRONMENT";
const LOG_ENVIRONMENT_ENTRY: &str = "log.environment";
const LOG_ENVIRONMENT_DEFAULT: Environment = Environment::Dev;
const LOG_FILTER_VAR: &str = "LOG_FILTER";
const LOG_FILTER_ENTRY: &str = "log.filter";
const LOG_FILTER_DEFAULT: &str = "info";

#[derive(Debug, Display, Error)]
pub enum Error {
    /// Failed to parse {LOG_ENVIRONMENT_ENTRY:?}: {0}
    ParseEnvironment(provider::Error),
    /// Failed to parse {LOG_FILTER_ENTRY:?}: {0}
    ParseFilter(provider::Error),
    /// Failed to start global subscriber: {0}
    StartGlobal(tracing_subscriber::util::TryInitError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Environment {
    Dev,
    Staging,
    Production,
}

#[derive(Debug)]
pub struct Config {
    pub environment: Environment,
    pub filter: String,
}

impl Config {
    /// Install the global `tracing` subscriber.
    ///
    /// `RUST_LOG` takes precedence over the configured filter. Dev builds log
    /// human readable lines, deployed environments log JSON.
    pub fn start(&self) -> Result<(), Error> {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.filter));
        let registry = Registry::default().with(filter).with(ErrorLayer::default());

        match self.environment {
            Environment::Dev => registry.with(fmt::layer().with_ansi(true)).try_init(),
            Environment::Staging | Environment::Production => {
                registry.with(fmt::layer().json()).try_init()
            }
        }
        .map_err(Error::StartGlobal)
    }

    pub const fn service_name(&self) -> &'static str {
        match self.environment {
            Environment::Dev => SERVICE_NAME_DEV,
            Environment::Staging => SERVICE_NAME_STAGING,
            Environment::Production => SERVICE_NAME_PRODUCTION,
        }
    }
}

impl TryFrom<&Provider> for Config {
    type Error = Error;

    fn try_from(provider: &Provider) -> Result<Self, Self::Error> {
        let environment = provider
            .read_or(
                LOG_ENVIRONMENT_DEFAULT,
                LOG_ENVIRONMENT_VAR,
                LOG_ENVIRONMENT_ENTRY,
            )
            .map_err(Error::ParseEnvironment)?;
        let filter = provider
            .read_or(LOG_FILTER_DEFAULT, LOG_FILTER_VAR, LOG_FILTER_ENTRY)
            .map_err(Error::ParseFilter)?;

        Ok(Config {
            environment,
            filter,
        })
    }
}
