use std::io;
use thiserror::Error as ThisError;

/// Kinds of error this crate can return.
///
/// These map onto the severity tiers of the I2CP client: `Transport` and
/// `Protocol` are fatal to the connection they occur on, `Crypto` fails the
/// operation that requested it, `LimitExceeded` and `Misuse` are recoverable
/// and only abandon the single call that triggered them.
#[derive(Debug, ThisError)]
pub enum I2cpError {
	/// Dial/read/write failure on the underlying transport.
	#[error("transport error: {0}")]
	Transport(String),
	/// Malformed frame: bad length, bad certificate invariant, unknown
	/// algorithm id, or any other structural violation of the wire format.
	#[error("protocol error: {0}")]
	Protocol(String),
	/// Signing or verification failure.
	#[error("crypto error: {0}")]
	Crypto(String),
	/// The client already has `MAX_SESSIONS_PER_CLIENT` sessions registered.
	#[error("session limit exceeded")]
	LimitExceeded,
	/// Caller misuse that does not warrant tearing down the connection, e.g.
	/// a non-b32 address when the router lacks host-lookup capability.
	#[error("misuse: {0}")]
	Misuse(String),
}

impl From<io::Error> for I2cpError {
	fn from(err: io::Error) -> I2cpError {
		I2cpError::Transport(err.to_string())
	}
}

pub type Result<T> = std::result::Result<T, I2cpError>;
