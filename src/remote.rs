//! HTTP [`GraphSource`] for the walker endpoints.

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use log::debug;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::config::ViewerConfig;
use crate::explorer::{Depth, FetchError, GraphSource, RawFragment};

#[derive(Deserialize)]
struct WalkerResponse {
	#[serde(default)]
	reports: Vec<RawFragment>,
}

/// Extracts the fragment from a walker response body (its first report).
pub fn parse_reports(body: &str) -> Result<RawFragment, FetchError> {
	let response: WalkerResponse =
		serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;
	response
		.reports
		.into_iter()
		.next()
		.ok_or(FetchError::EmptyReport)
}

fn full_graph_body(root: &str) -> Value {
	json!({ "root_node": root })
}

fn neighborhood_body(focus: &str, depth: Depth) -> Value {
	json!({ "depth": depth.get(), "node_id": focus })
}

#[derive(Clone)]
pub struct HttpGraphSource {
	client: reqwest::Client,
	graph_url: String,
	neighborhood_url: String,
	token: Option<String>,
}

impl HttpGraphSource {
	pub fn new(config: &ViewerConfig, token: Option<String>) -> Self {
		Self {
			client: reqwest::Client::new(),
			graph_url: config.graph_url(),
			neighborhood_url: config.neighborhood_url(),
			token,
		}
	}

	fn post(&self, url: &str, body: Value) -> LocalBoxFuture<'static, Result<RawFragment, FetchError>> {
		let mut request = self.client.post(url).json(&body);
		if let Some(token) = &self.token {
			request = request.bearer_auth(token);
		}
		let url = url.to_owned();
		async move {
			debug!("POST {url} {body}");
			let response = request
				.send()
				.await
				.map_err(|e| FetchError::Transport(e.to_string()))?;
			let status = response.status();
			if !status.is_success() {
				return Err(FetchError::Status {
					code: status.as_u16(),
				});
			}
			let text = response
				.text()
				.await
				.map_err(|e| FetchError::Transport(e.to_string()))?;
			parse_reports(&text)
		}
		.boxed_local()
	}
}

impl GraphSource for HttpGraphSource {
	fn fetch_full_graph(&self, root: &str) -> LocalBoxFuture<'static, Result<RawFragment, FetchError>> {
		self.post(&self.graph_url, full_graph_body(root))
	}

	fn fetch_neighborhood(
		&self,
		focus: &str,
		depth: Depth,
	) -> LocalBoxFuture<'static, Result<RawFragment, FetchError>> {
		self.post(&self.neighborhood_url, neighborhood_body(focus, depth))
	}
}

/// Bearer token saved by the host application, if any.
pub fn stored_token(key: &str) -> Option<String> {
	web_sys::window()?
		.local_storage()
		.ok()??
		.get_item(key)
		.ok()?
		.filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_reports_takes_first_report() {
		let fragment = parse_reports(
			r#"{"reports": [{"nodes": [{"id": "a"}], "edges": []}, {"nodes": []}]}"#,
		)
		.unwrap();
		assert_eq!(fragment.nodes.len(), 1);
		assert!(fragment.edges.is_empty());
	}

	#[test]
	fn test_parse_reports_errors() {
		assert!(matches!(
			parse_reports(r#"{"reports": []}"#),
			Err(FetchError::EmptyReport)
		));
		assert!(matches!(
			parse_reports(r#"{"status": 200}"#),
			Err(FetchError::EmptyReport)
		));
		assert!(matches!(parse_reports("<html>"), Err(FetchError::Decode(_))));
		assert!(matches!(
			parse_reports(r#"{"reports": ["oops"]}"#),
			Err(FetchError::Decode(_))
		));
	}

	#[test]
	fn test_request_bodies() {
		assert_eq!(full_graph_body("n1"), json!({ "root_node": "n1" }));
		assert_eq!(
			neighborhood_body("n2", Depth::new(3).unwrap()),
			json!({ "depth": 3, "node_id": "n2" })
		);
	}
}
