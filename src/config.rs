//! `$HOME/.i2cp.conf` loader: a line-oriented `key=value;` file recognizing
//! the five keys the client cares about at connect time.

use std::env;
use std::fs;

use lazy_static::lazy_static;
use regex::Regex;

use crate::transport::{DEFAULT_ADDRESS, DEFAULT_PORT};

lazy_static! {
	static ref CONFIG_LINE: Regex = Regex::new(r"\s*([\w.]+)=\s*(.+)\s*;\s*").unwrap();
}

/// Connection parameters resolved from `$HOME/.i2cp.conf`, if present,
/// overridable by explicit `ClientOptions`.
#[derive(Debug, Clone)]
pub struct Config {
	pub host: String,
	pub port: u16,
	pub use_tls: bool,
	pub username: Option<String>,
	pub password: Option<String>,
}

impl Default for Config {
	fn default() -> Config {
		Config {
			host: DEFAULT_ADDRESS.to_string(),
			port: DEFAULT_PORT,
			use_tls: false,
			username: None,
			password: None,
		}
	}
}

impl Config {
	/// Loads `$HOME/.i2cp.conf`; returns the default config if the file or
	/// `$HOME` does not exist.
	pub fn load_from_home() -> Config {
		let Some(home) = env::var_os("HOME") else {
			return Config::default();
		};
		let path = std::path::Path::new(&home).join(".i2cp.conf");
		match fs::read_to_string(&path) {
			Ok(contents) => Config::parse(&contents),
			Err(_) => Config::default(),
		}
	}

	pub fn parse(contents: &str) -> Config {
		let mut config = Config::default();
		for cap in CONFIG_LINE.captures_iter(contents) {
			let key = cap[1].trim();
			let value = cap[2].trim();
			match key {
				"i2cp.tcp.host" => config.host = value.to_string(),
				"i2cp.tcp.port" => {
					if let Ok(port) = value.parse() {
						config.port = port;
					}
				}
				"i2cp.tcp.SSL" => config.use_tls = value == "true",
				"i2cp.tcp.username" => config.username = Some(value.to_string()),
				"i2cp.tcp.password" => config.password = Some(value.to_string()),
				_ => {}
			}
		}
		config
	}
}

/// Builder for overriding the connection parameters `Config` would otherwise
/// derive from `$HOME/.i2cp.conf`, without requiring the caller to edit that
/// file.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
	address: Option<String>,
	port: Option<u16>,
	use_tls: Option<bool>,
	tls_client_cert: Option<String>,
	username: Option<String>,
	password: Option<String>,
}

impl ClientOptions {
	pub fn new() -> ClientOptions {
		ClientOptions::default()
	}

	pub fn address(mut self, address: impl Into<String>) -> Self {
		self.address = Some(address.into());
		self
	}

	pub fn port(mut self, port: u16) -> Self {
		self.port = Some(port);
		self
	}

	pub fn use_tls(mut self, use_tls: bool) -> Self {
		self.use_tls = Some(use_tls);
		self
	}

	pub fn tls_client_cert(mut self, path: impl Into<String>) -> Self {
		self.tls_client_cert = Some(path.into());
		self
	}

	pub fn username(mut self, username: impl Into<String>) -> Self {
		self.username = Some(username.into());
		self
	}

	pub fn password(mut self, password: impl Into<String>) -> Self {
		self.password = Some(password.into());
		self
	}

	pub(crate) fn tls_client_cert_path(&self) -> Option<&str> {
		self.tls_client_cert.as_deref()
	}

	/// Overwrites only the fields this builder has set, leaving the rest of
	/// `config` untouched.
	pub fn apply(&self, config: &mut Config) {
		if let Some(address) = &self.address {
			config.host = address.clone();
		}
		if let Some(port) = self.port {
			config.port = port;
		}
		if let Some(use_tls) = self.use_tls {
			config.use_tls = use_tls;
		}
		if let Some(username) = &self.username {
			config.username = Some(username.clone());
		}
		if let Some(password) = &self.password {
			config.password = Some(password.clone());
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_recognized_keys() {
		let config = Config::parse(
			"i2cp.tcp.host=10.0.0.1;\ni2cp.tcp.port=7777;\ni2cp.tcp.SSL=true;\ni2cp.tcp.username=alice;\ni2cp.tcp.password=secret;\n",
		);
		assert_eq!(config.host, "10.0.0.1");
		assert_eq!(config.port, 7777);
		assert!(config.use_tls);
		assert_eq!(config.username.as_deref(), Some("alice"));
		assert_eq!(config.password.as_deref(), Some("secret"));
	}

	#[test]
	fn unrecognized_keys_are_ignored() {
		let config = Config::parse("some.other.key=value;\n");
		assert_eq!(config.host, DEFAULT_ADDRESS);
		assert_eq!(config.port, DEFAULT_PORT);
	}

	#[test]
	fn client_options_only_overwrite_fields_that_were_set() {
		let mut config = Config::parse("i2cp.tcp.host=10.0.0.1;\ni2cp.tcp.port=7777;\n");
		let options = ClientOptions::new().port(8888);
		options.apply(&mut config);
		assert_eq!(config.host, "10.0.0.1");
		assert_eq!(config.port, 8888);
	}

	#[test]
	fn missing_file_falls_back_to_defaults() {
		let config = Config::parse("");
		assert_eq!(config.host, DEFAULT_ADDRESS);
	}
}
