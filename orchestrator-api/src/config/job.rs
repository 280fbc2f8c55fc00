use displaydoc::Display;
use thiserror::Error;

use super::provider::{self, Provider};

const DEFAULT_QUEUE_VAR: &str = "DEFAULT_QUEUE";
const DEFAULT_QUEUE_ENTRY: &str = "job.default_queue";
const DEFAULT_QUEUE_DEFAULT: &str = "default";

#[derive(Debug, Display, Error)]
pub enum Error {
    /// Failed to parse {DEFAULT_QUEUE_ENTRY:?}: {0}
    DefaultQueue(provider::Error),
}

#[derive(Debug)]
pub struct Config {
    /// Queue assigned to submissions that leave `queue` empty.
    pub default_queue: String,
}

impl TryFrom<&Provider> for Config {
    type Error = Error;

    fn try_from(provider: &Provider) -> Result<Self, Self::Error> {
        let default_queue = provider
            .read_or(
                DEFAULT_QUEUE_DEFAULT,
                DEFAULT_QUEUE_VAR,
                DEFAULT_QUEUE_ENTRY,
            )
            .map_err(Error::DefaultQueue)?;

        Ok(Config { default_queue })
    }
}
