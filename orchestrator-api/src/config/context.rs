use std::sync::Arc;

use displaydoc::Display;
use thiserror::Error;

use crate::model::event::{EventSource, SimulatedEvents};

use super::Config;

#[derive(Debug, Display, Error)]
pub enum Error {
    /// Failed to build Config: {0}
    Config(super::Error),
    /// Builder is missing Config.
    MissingConfig,
    /// Builder is missing an EventSource.
    MissingEvents,
}

/// Service `Context` containing metadata that can be passed down to handlers.
///
/// Each field is wrapped in an Arc so other structs may retain their own
/// internal reference.
#[derive(Clone)]
pub struct Context {
    pub config: Arc<Config>,
    pub events: Arc<Box<dyn EventSource + Send + Sync + 'static>>,
}

impl Context {
    pub fn new() -> Result<Arc<Self>, Error> {
        let config = Config::new().map_err(Error::Config)?;
        Self::builder_from(config).build()
    }

    pub fn from_default_toml() -> Result<Arc<Self>, Error> {
        let config = Config::from_default_toml().map_err(Error::Config)?;
        Self::builder_from(config).build()
    }

    /// A `Builder` with the simulated event source paced by `config.event`.
    pub fn builder_from(config: Config) -> Builder {
        let events = SimulatedEvents::new(*config.event.delay);
        Builder::default().events(events).config(config)
    }
}

/// Incrementally build a new `Context` from constituent parts.
#[derive(Default)]
pub struct Builder {
    config: Option<Config>,
    events: Option<Box<dyn EventSource + Send + Sync + 'static>>,
}

impl Builder {
    pub fn build(self) -> Result<Arc<Context>, Error> {
        Ok(Arc::new(Context {
            config: self.config.ok_or(Error::MissingConfig).map(Arc::new)?,
            events: self.events.ok_or(Error::MissingEvents).map(Arc::new)?,
        }))
    }

    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn events<E>(mut self, events: E) -> Self
    where
        E: EventSource + Send + Sync + 'static,
    {
        self.events = Some(Box::new(events));
        self
    }
}
