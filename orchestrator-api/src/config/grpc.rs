use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use displaydoc::Display;
use thiserror::Error;

use super::provider::{self, Provider};

const IP_VAR: &str = "BIND_IP";
const IP_ENTRY: &str = "grpc.ip";
const IP_DEFAULT: Ipv4Addr = Ipv4Addr::UNSPECIFIED;
const PORT_VAR: &str = "PORT";
const PORT_ENTRY: &str = "grpc.port";
const PORT_DEFAULT: u16 = 50051;
const REQUEST_CONCURRENCY_LIMIT_VAR: &str = "REQUEST_CONCURRENCY_LIMIT";
const REQUEST_CONCURRENCY_LIMIT_ENTRY: &str = "grpc.request_concurrency_limit";
const REQUEST_CONCURRENCY_LIMIT_DEFAULT: usize = 32;
const STREAM_BUFFER_VAR: &str = "STREAM_BUFFER";
const STREAM_BUFFER_ENTRY: &str = "grpc.stream_buffer";
const STREAM_BUFFER_DEFAULT: usize = 128;

#[derive(Debug, Display, Error)]
pub enum Error {
    /// Failed to parse {IP_ENTRY:?}: {0}
    Ip(provider::Error),
    /// Failed to parse {PORT_ENTRY:?}: {0}
    Port(provider::Error),
    /// Failed to parse {REQUEST_CONCURRENCY_LIMIT_ENTRY:?}: {0}
    RequestConcurrencyLimit(provider::Error),
    /// Failed to parse {STREAM_BUFFER_ENTRY:?}: {0}
    StreamBuffer(provider::Error),
    /// {STREAM_BUFFER_ENTRY:?} must be greater than zero.
    ZeroStreamBuffer,
}

#[derive(Debug)]
pub struct Config {
    /// Address the job orchestration service listens on.
    pub ip: IpAddr,
    pub port: u16,
    pub request_concurrency_limit: usize,
    /// Capacity of the channel between a streaming task and its response.
    pub stream_buffer: usize,
}

impl Config {
    pub const fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }

    /// The `http://` endpoint a local client dials to reach this service.
    pub fn endpoint(&self) -> String {
        let ip = if self.ip.is_unspecified() {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            self.ip
        };
        format!("http://{}", SocketAddr::new(ip, self.port))
    }
}

impl TryFrom<&Provider> for Config {
    type Error = Error;

    fn try_from(provider: &Provider) -> Result<Self, Self::Error> {
        let ip = provider
            .read_or(IP_DEFAULT, IP_VAR, IP_ENTRY)
            .map_err(Error::Ip)?;
        let port = provider
            .read_or(PORT_DEFAULT, PORT_VAR, PORT_ENTRY)
            .map_err(Error::Port)?;
        let request_concurrency_limit = provider
            .read_or(
                REQUEST_CONCURRENCY_LIMIT_DEFAULT,
                REQUEST_CONCURRENCY_LIMIT_VAR,
                REQUEST_CONCURRENCY_LIMIT_ENTRY,
            )
            .map_err(Error::RequestConcurrencyLimit)?;
        let stream_buffer = provider
            .read_or(
                STREAM_BUFFER_DEFAULT,
                STREAM_BUFFER_VAR,
                STREAM_BUFFER_ENTRY,
            )
            .map_err(Error::StreamBuffer)?;

        // tokio panics on a zero capacity channel
        if stream_buffer == 0 {
            return Err(Error::ZeroStreamBuffer);
        }

        Ok(Config {
            ip,
            port,
            request_concurrency_limit,
            stream_buffer,
        })
    }
}
