//! Azure Service Bus queue client over REST
//!
//! This crate talks to a single Service Bus queue through its HTTPS interface:
//! - send messages with broker and user properties
//! - receive messages in peek-lock mode
//! - unlock or delete locked messages
//!
//! Every request is authorized with a Shared Access Signature computed from the
//! queue url and the shared access key. The signature is valid for five minutes.
//!
//! # Example
//!
//! ```rust,no_run
//! use sbqueue_core::{Context, ErrorKind, OsEnv, Result};
//! use sbqueue_servicebus::{Config, Message, QueueClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let ctx = Context::new().with_env(OsEnv);
//!
//!     // Reads AZURE_SERVICEBUS_CONNECTION_STRING and friends.
//!     let config = Config::default().with_timeout(30).from_env(&ctx)?;
//!     let client = QueueClient::new(ctx, config)?;
//!
//!     client
//!         .send(&Message::new("Hello!").with_property("Prop1", "Value1"))
//!         .await?;
//!
//!     match client.receive().await {
//!         Ok(msg) => client.delete(&msg).await?,
//!         Err(err) if err.kind() == ErrorKind::NoMessagesAvailable => {}
//!         Err(err) => return Err(err),
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod constants;

mod config;
pub use config::Config;
mod connection_string;

mod message;
pub use message::Message;
mod broker_properties;
pub use broker_properties::BrokerProperties;

mod sas;
pub use sas::{signature, SasSigner};

mod request;
mod response;

mod client;
pub use client::QueueClient;
