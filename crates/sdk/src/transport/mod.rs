//! Transport layer for the Bullpen SDK.

pub mod http;

pub use http::HttpTransport;
