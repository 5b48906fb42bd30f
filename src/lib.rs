//! ipgeo - a minimal IP geolocation service
//!
//! Resolves the caller's IP address, or an explicitly supplied IPv4/IPv6
//! address, to country, region and city names using a local MaxMind City
//! database, honouring the client's `Accept-Language`.
//!
//! # Architecture
//! - `api`: HTTP handlers, parameter binding and middleware
//! - `services`: GeoIP provider, locale selection and the lookup pipeline
//! - `utils`: Client IP extraction behind proxies
//! - `config`: Static configuration (TOML + environment)
//! - `runtime`: Startup, shutdown and execution modes
//! - `system`: Logging

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod system;
pub mod utils;
