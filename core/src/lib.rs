//! Core components for talking to Azure Service Bus over REST.
//!
//! This crate provides the foundational types shared by the sbqueue crates.
//!
//! ## Overview
//!
//! - **Context**: A container that holds the HTTP transport override, the logging sink and
//!   environment access used by a client.
//! - **HttpSend**: The seam between a client and the HTTP stack. Implementations live in
//!   `context/*` crates, tests provide their own.
//! - **Error**: A single error type whose [`ErrorKind`] covers both local failures and the
//!   status codes returned by the service.
//!
//! ## Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use bytes::Bytes;
//! use sbqueue_core::{Context, HttpSend, Result};
//!
//! #[derive(Debug)]
//! struct Canned;
//!
//! #[async_trait]
//! impl HttpSend for Canned {
//!     async fn http_send(&self, _: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
//!         Ok(http::Response::new(Bytes::from_static(b"hello")))
//!     }
//! }
//!
//! let ctx = Context::new().with_http_send(Canned);
//! assert!(ctx.http_send_override().is_some());
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: HMAC and base64 helpers
//! - [`time`]: RFC 2616 date handling
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::Context;
pub use context::Env;
pub use context::OsEnv;
pub use context::StaticEnv;
mod http;
pub use http::HttpSend;

mod error;
pub use error::{Error, ErrorKind, Result};
