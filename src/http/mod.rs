//! HTTP 传输层

mod client_factory;

pub use client_factory::{ClientBuildError, ClientFactory};
