#![warn(
    rust_2018_idioms,
    rust_2021_compatibility,
    future_incompatible,
    nonstandard_style,
    unused,
    clippy::all,
    clippy::nursery,
    clippy::pedantic
)]
#![allow(
    clippy::default_trait_access,
    clippy::enum_glob_use,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::use_self
)]

pub mod config;
pub mod grpc;
pub mod model;
pub mod server;
pub mod util;
