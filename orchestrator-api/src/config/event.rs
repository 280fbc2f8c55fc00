use std::time::Duration;

use displaydoc::Display;
use thiserror::Error;

use super::provider::{self, Provider};
use super::HumanTime;

const DELAY_VAR: &str = "EVENT_DELAY";
const DELAY_ENTRY: &str = "event.delay";
const DELAY_DEFAULT: Duration = Duration::from_millis(500);

#[derive(Debug, Display, Error)]
pub enum Error {
    /// Failed to parse {DELAY_ENTRY:?}: {0}
    Delay(provider::Error),
}

#[derive(Debug)]
pub struct Config {
    /// Simulated time between two lifecycle events of a job.
    pub delay: HumanTime,
}

impl TryFrom<&Provider> for Config {
    type Error = Error;

    fn try_from(provider: &Provider) -> Result<Self, Self::Error> {
        let delay = provider
            .read_or(DELAY_DEFAULT, DELAY_VAR, DELAY_ENTRY)
            .map_err(Error::Delay)?;

        Ok(Config { delay })
    }
}
