//! The byte-oriented transport contract and its TCP/TLS implementation.
//!
//! `Client` is generic over anything implementing `Transport`; tests swap in
//! an in-process `TcpListener` standing in for the router.

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use log::debug;

use crate::error::{I2cpError, Result};

/// Properties a transport recognizes via `set_property`.
pub const PROP_ADDRESS: &str = "ADDRESS";
pub const PROP_PORT: &str = "PORT";
pub const PROP_USE_TLS: &str = "USE_TLS";
pub const PROP_TLS_CLIENT_CERT: &str = "TLS_CLIENT_CERT";

pub const DEFAULT_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 7654;

/// A blocking byte-oriented connection to the router.
pub trait Transport: Send {
	fn connect(&mut self) -> Result<()>;
	fn send(&mut self, bytes: &[u8]) -> Result<usize>;
	fn receive(&mut self, buf: &mut [u8]) -> Result<usize>;
	/// Zero-deadline readability probe; must return promptly.
	fn can_read(&mut self) -> Result<bool>;
	fn disconnect(&mut self);
	fn is_connected(&self) -> bool;
	fn set_property(&mut self, key: &str, value: &str) -> Result<()>;
}

enum Conn {
	Plain(TcpStream),
	#[cfg(feature = "tls")]
	Tls(Box<native_tls::TlsStream<TcpStream>>),
}

/// Default production transport: plain TCP, or TLS when `USE_TLS` is set
/// before `connect`.
pub struct TcpTransport {
	address: String,
	port: u16,
	use_tls: bool,
	conn: Option<Conn>,
}

impl TcpTransport {
	pub fn new() -> TcpTransport {
		TcpTransport {
			address: DEFAULT_ADDRESS.to_string(),
			port: DEFAULT_PORT,
			use_tls: false,
			conn: None,
		}
	}
}

impl Default for TcpTransport {
	fn default() -> TcpTransport {
		TcpTransport::new()
	}
}

impl Transport for TcpTransport {
	fn connect(&mut self) -> Result<()> {
		let addr = format!("{}:{}", self.address, self.port);
		debug!("connecting to {addr} (tls={})", self.use_tls);
		let stream = TcpStream::connect(&addr)?;
		stream.set_nodelay(true).ok();
		if self.use_tls {
			#[cfg(feature = "tls")]
			{
				let connector = native_tls::TlsConnector::new()
					.map_err(|e| I2cpError::Transport(format!("tls connector: {e}")))?;
				let tls = connector
					.connect(&self.address, stream)
					.map_err(|e| I2cpError::Transport(format!("tls handshake: {e}")))?;
				self.conn = Some(Conn::Tls(Box::new(tls)));
				return Ok(());
			}
			#[cfg(not(feature = "tls"))]
			{
				return Err(I2cpError::Misuse(
					"USE_TLS requested but the tls feature is disabled".into(),
				));
			}
		}
		self.conn = Some(Conn::Plain(stream));
		Ok(())
	}

	fn send(&mut self, bytes: &[u8]) -> Result<usize> {
		match self.conn.as_mut() {
			Some(Conn::Plain(s)) => Ok(s.write(bytes)?),
			#[cfg(feature = "tls")]
			Some(Conn::Tls(s)) => Ok(s.write(bytes)?),
			None => Err(I2cpError::Transport("not connected".into())),
		}
	}

	fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
		match self.conn.as_mut() {
			Some(Conn::Plain(s)) => Ok(s.read(buf)?),
			#[cfg(feature = "tls")]
			Some(Conn::Tls(s)) => Ok(s.read(buf)?),
			None => Err(I2cpError::Transport("not connected".into())),
		}
	}

	fn can_read(&mut self) -> Result<bool> {
		let stream = match self.conn.as_ref() {
			Some(Conn::Plain(s)) => s,
			#[cfg(feature = "tls")]
			Some(Conn::Tls(s)) => s.get_ref(),
			None => return Err(I2cpError::Transport("not connected".into())),
		};
		stream.set_read_timeout(Some(Duration::from_millis(0))).ok();
		let mut probe = [0u8; 1];
		let readable = match stream.peek(&mut probe) {
			Ok(n) => n > 0,
			Err(e) if e.kind() == io::ErrorKind::WouldBlock => false,
			Err(e) => return Err(e.into()),
		};
		stream.set_read_timeout(None).ok();
		Ok(readable)
	}

	fn disconnect(&mut self) {
		if let Some(Conn::Plain(s)) = &self.conn {
			let _ = s.shutdown(std::net::Shutdown::Both);
		}
		self.conn = None;
	}

	fn is_connected(&self) -> bool {
		self.conn.is_some()
	}

	fn set_property(&mut self, key: &str, value: &str) -> Result<()> {
		match key {
			PROP_ADDRESS => self.address = value.to_string(),
			PROP_PORT => {
				self.port = value
					.parse()
					.map_err(|_| I2cpError::Misuse(format!("invalid port {value}")))?
			}
			PROP_USE_TLS => self.use_tls = value == "true" || value == "1",
			PROP_TLS_CLIENT_CERT => {
				// Client-certificate authentication is not implemented; the
				// property is accepted so config round-trips cleanly.
			}
			other => return Err(I2cpError::Misuse(format!("unknown transport property {other}"))),
		}
		Ok(())
	}
}
