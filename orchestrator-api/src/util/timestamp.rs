use std::ops::Add;

use chrono::{DateTime, SubsecRound, Utc};
use derive_more::Deref;
use displaydoc::Display;
use thiserror::Error;

#[derive(Debug, Display, Error)]
pub enum Error {
    /// Failed to parse SecondsUtc from seconds: {0}
    ParseSeconds(i64),
}

/// A wrapper around a `chrono::DateTime<Utc>` with second precision.
#[derive(Clone, Copy, Debug, Deref, PartialEq, Eq, PartialOrd, Ord)]
pub struct SecondsUtc(DateTime<Utc>);

impl SecondsUtc {
    pub fn new(seconds: i64) -> Result<Self, Error> {
        DateTime::from_timestamp(seconds, 0)
            .map(SecondsUtc)
            .ok_or(Error::ParseSeconds(seconds))
    }

    pub fn now() -> Self {
        SecondsUtc(Utc::now().trunc_subsecs(0))
    }

    /// Seconds since the unix epoch, as carried on the wire.
    pub fn unix(self) -> i64 {
        self.0.timestamp()
    }
}

impl Add<chrono::Duration> for SecondsUtc {
    type Output = Self;

    fn add(self, duration: chrono::Duration) -> Self {
        SecondsUtc(self.0 + duration)
    }
}
