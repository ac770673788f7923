//! Viewer configuration, resolved from the page URL query.

use thiserror::Error;

use crate::explorer::TraversalMode;

pub const DEFAULT_TOKEN_KEY: &str = "jivas-token";
pub const DEFAULT_GRAPH_ENDPOINT: &str = "/walker/get_graph";
pub const DEFAULT_NEIGHBORHOOD_ENDPOINT: &str = "/walker/get_node_connections";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
	#[error("no `host` given in the page query")]
	MissingHost,

	#[error("no `root` node given in the page query")]
	MissingRoot,

	#[error("unknown traversal mode `{0}` (expected Full, Step or Focus)")]
	InvalidMode(String),
}

/// Where the graph lives and how to start exploring it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewerConfig {
	/// Base URL of the graph service, without a trailing slash.
	pub host: String,
	pub root_node: String,
	/// `localStorage` key holding the bearer token.
	pub token_key: String,
	pub graph_endpoint: String,
	pub neighborhood_endpoint: String,
	pub initial_mode: TraversalMode,
}

impl ViewerConfig {
	pub fn new(host: impl Into<String>, root_node: impl Into<String>) -> Self {
		Self {
			host: host.into().trim_end_matches('/').to_owned(),
			root_node: root_node.into(),
			token_key: DEFAULT_TOKEN_KEY.to_owned(),
			graph_endpoint: DEFAULT_GRAPH_ENDPOINT.to_owned(),
			neighborhood_endpoint: DEFAULT_NEIGHBORHOOD_ENDPOINT.to_owned(),
			initial_mode: TraversalMode::default(),
		}
	}

	/// Builds a config from query parameters: `host` and `root` (or
	/// `root_node`) are required; `mode`, `token_key`, `graph_endpoint` and
	/// `neighborhood_endpoint` override the defaults.
	pub fn from_query<F>(get: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let present = |key: &str| get(key).filter(|v| !v.trim().is_empty());

		let host = present("host").ok_or(ConfigError::MissingHost)?;
		let root = present("root")
			.or_else(|| present("root_node"))
			.ok_or(ConfigError::MissingRoot)?;
		let mut config = Self::new(host, root);

		if let Some(mode) = present("mode") {
			config.initial_mode =
				TraversalMode::parse(&mode).ok_or(ConfigError::InvalidMode(mode))?;
		}
		if let Some(key) = present("token_key") {
			config.token_key = key;
		}
		if let Some(path) = present("graph_endpoint") {
			config.graph_endpoint = path;
		}
		if let Some(path) = present("neighborhood_endpoint") {
			config.neighborhood_endpoint = path;
		}
		Ok(config)
	}

	pub fn graph_url(&self) -> String {
		join(&self.host, &self.graph_endpoint)
	}

	pub fn neighborhood_url(&self) -> String {
		join(&self.host, &self.neighborhood_endpoint)
	}
}

fn join(host: &str, path: &str) -> String {
	format!("{host}/{}", path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use super::*;

	fn query(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let map: HashMap<String, String> = pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		move |k| map.get(k).cloned()
	}

	#[test]
	fn test_defaults() {
		let config =
			ViewerConfig::from_query(query(&[("host", "http://localhost:8000/"), ("root", "n1")]))
				.unwrap();
		assert_eq!(config.host, "http://localhost:8000");
		assert_eq!(config.root_node, "n1");
		assert_eq!(config.initial_mode, TraversalMode::Step);
		assert_eq!(config.token_key, DEFAULT_TOKEN_KEY);
		assert_eq!(config.graph_url(), "http://localhost:8000/walker/get_graph");
		assert_eq!(
			config.neighborhood_url(),
			"http://localhost:8000/walker/get_node_connections"
		);
	}

	#[test]
	fn test_overrides() {
		let config = ViewerConfig::from_query(query(&[
			("host", "https://graph.example"),
			("root_node", "abc"),
			("mode", "focus"),
			("graph_endpoint", "api/full"),
		]))
		.unwrap();
		assert_eq!(config.root_node, "abc");
		assert_eq!(config.initial_mode, TraversalMode::Focus);
		assert_eq!(config.graph_url(), "https://graph.example/api/full");
	}

	#[test]
	fn test_errors() {
		assert_eq!(
			ViewerConfig::from_query(query(&[("root", "n1")])),
			Err(ConfigError::MissingHost)
		);
		assert_eq!(
			ViewerConfig::from_query(query(&[("host", "h"), ("root", " ")])),
			Err(ConfigError::MissingRoot)
		);
		assert_eq!(
			ViewerConfig::from_query(query(&[("host", "h"), ("root", "n"), ("mode", "zoom")])),
			Err(ConfigError::InvalidMode("zoom".into()))
		);
	}
}
