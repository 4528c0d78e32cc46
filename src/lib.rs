//! Client library for I2CP, the wire protocol between an application and a
//! local I2P router. Dials a router over TCP (optionally TLS), negotiates
//! the handshake, creates sessions bound to cryptographic destinations,
//! publishes lease sets, and exchanges application payloads.

pub mod certificate;
pub mod client;
pub mod config;
pub mod crypto;
pub mod destination;
pub mod error;
pub mod lease;
pub mod session;
pub mod session_config;
pub mod stream;
pub mod transport;
pub mod version;

pub use certificate::{CertType, Certificate};
pub use client::{connect_from_config, connect_with_options, Client};
pub use config::{ClientOptions, Config};
pub use destination::Destination;
pub use error::{I2cpError, Result};
pub use lease::Lease;
pub use session::{Session, SessionCallbacks, SessionStatus};
pub use session_config::{ConfigOption, SessionConfig};
pub use transport::{TcpTransport, Transport};
pub use version::{RouterInfo, Version};
