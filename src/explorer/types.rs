//! Node, edge and fragment records, and the normalization from the raw
//! walker payloads.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::error::MergeSkip;

/// Server-assigned node identifier.
pub type NodeId = String;
/// Server-assigned edge identifier.
pub type EdgeId = String;
/// Free-form attribute bag carried by nodes and edges.
pub type Attributes = Map<String, Value>;

/// Separator between the segments of a compound endpoint identifier.
pub const ENDPOINT_SEPARATOR: char = ':';

/// A discovered node.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	/// Unique id.
	pub id: NodeId,
	/// Display label; empty when the server sent none.
	pub label: String,
	/// Color grouping key.
	pub group: String,
	/// Everything else the server attached.
	pub attributes: Attributes,
}

/// A discovered directed edge. Either endpoint may not be in the store yet.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	/// Unique id.
	pub id: EdgeId,
	/// Display label.
	pub label: String,
	/// Source endpoint.
	pub from: NodeId,
	/// Target endpoint.
	pub to: NodeId,
	/// Everything else the server attached.
	pub attributes: Attributes,
}

#[derive(Deserialize)]
struct RawNode {
	id: String,
	#[serde(default)]
	name: String,
	#[serde(default)]
	data: Value,
}

#[derive(Deserialize)]
struct RawEdge {
	id: String,
	#[serde(default)]
	name: String,
	#[serde(default)]
	source: String,
	#[serde(default)]
	target: String,
	#[serde(default)]
	data: Value,
}

/// Fragment exactly as returned by the remote walkers.
///
/// Records stay untyped until [`GraphFragment::normalize`] so that one bad
/// record cannot fail decoding of the whole response.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawFragment {
	/// Undecoded node records.
	#[serde(default)]
	pub nodes: Vec<Value>,
	/// Undecoded edge records.
	#[serde(default)]
	pub edges: Vec<Value>,
}

/// Normalized nodes and edges returned by one fetch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphFragment {
	/// Decoded nodes.
	pub nodes: Vec<Node>,
	/// Decoded edges.
	pub edges: Vec<Edge>,
}

/// Trailing segment of a compound identifier such as `n:Agent:abc`.
///
/// Identifiers without a separator yield an empty endpoint.
pub fn last_segment(compound: &str) -> &str {
	match compound.rfind(ENDPOINT_SEPARATOR) {
		Some(at) => &compound[at + ENDPOINT_SEPARATOR.len_utf8()..],
		None => "",
	}
}

fn attributes(id: &str, data: Value) -> Result<Attributes, MergeSkip> {
	match data {
		Value::Object(map) => Ok(map),
		Value::Null => Ok(Attributes::new()),
		_ => Err(MergeSkip::InvalidAttributes { id: id.to_owned() }),
	}
}

fn node_from_raw(value: Value) -> Result<Node, MergeSkip> {
	let raw: RawNode = serde_json::from_value(value).map_err(|e| MergeSkip::Malformed {
		record: "node",
		reason: e.to_string(),
	})?;
	if raw.id.is_empty() {
		return Err(MergeSkip::MissingId { record: "node" });
	}
	let attributes = attributes(&raw.id, raw.data)?;
	Ok(Node {
		label: raw.name.clone(),
		group: raw.name,
		id: raw.id,
		attributes,
	})
}

fn edge_from_raw(value: Value) -> Result<Edge, MergeSkip> {
	let raw: RawEdge = serde_json::from_value(value).map_err(|e| MergeSkip::Malformed {
		record: "edge",
		reason: e.to_string(),
	})?;
	if raw.id.is_empty() {
		return Err(MergeSkip::MissingId { record: "edge" });
	}
	let attributes = attributes(&raw.id, raw.data)?;
	Ok(Edge {
		from: last_segment(&raw.source).to_owned(),
		to: last_segment(&raw.target).to_owned(),
		label: raw.name,
		id: raw.id,
		attributes,
	})
}

impl GraphFragment {
	/// Maps raw records to nodes and edges, collecting the records that had
	/// to be skipped instead of failing the whole fragment.
	pub fn normalize(raw: RawFragment) -> (Self, Vec<MergeSkip>) {
		let mut skipped = Vec::new();
		let nodes = raw
			.nodes
			.into_iter()
			.filter_map(|v| node_from_raw(v).map_err(|e| skipped.push(e)).ok())
			.collect();
		let edges = raw
			.edges
			.into_iter()
			.filter_map(|v| edge_from_raw(v).map_err(|e| skipped.push(e)).ok())
			.collect();
		(Self { nodes, edges }, skipped)
	}

	/// True when the fragment carries no records.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.edges.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;
	use serde_json::json;

	use super::*;

	#[rstest]
	#[case("n:Agent:abc", "abc")]
	#[case("a:b", "b")]
	#[case("trailing:", "")]
	#[case("plain", "")]
	#[case("", "")]
	fn test_last_segment(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(last_segment(input), expected);
	}

	#[test]
	fn test_normalize_maps_raw_records() {
		let raw: RawFragment = serde_json::from_value(json!({
			"nodes": [{ "id": "n1", "name": "Agent", "data": { "k": 1 } }],
			"edges": [{
				"id": "e1",
				"name": "owns",
				"source": "n:Agent:n1",
				"target": "n:Memory:n2",
				"data": {}
			}]
		}))
		.unwrap();

		let (fragment, skipped) = GraphFragment::normalize(raw);
		assert!(skipped.is_empty());
		let node = &fragment.nodes[0];
		assert_eq!(node.label, "Agent");
		assert_eq!(node.group, "Agent");
		assert_eq!(node.attributes["k"], json!(1));
		let edge = &fragment.edges[0];
		assert_eq!((edge.from.as_str(), edge.to.as_str()), ("n1", "n2"));
		assert_eq!(edge.label, "owns");
	}

	#[test]
	fn test_normalize_skips_bad_records_only() {
		let raw: RawFragment = serde_json::from_value(json!({
			"nodes": [
				{ "id": "ok", "name": "A" },
				{ "id": "bad", "name": "A", "data": [1, 2] },
				{ "name": "no id" },
				{ "id": "", "name": "empty id" }
			],
			"edges": [
				{ "id": "e1", "source": "nosep", "target": "x:ok" },
				"not an object"
			]
		}))
		.unwrap();

		let (fragment, skipped) = GraphFragment::normalize(raw);
		assert_eq!(fragment.nodes.len(), 1);
		assert_eq!(fragment.nodes[0].id, "ok");
		assert!(fragment.nodes[0].attributes.is_empty());
		assert_eq!(fragment.edges.len(), 1);
		assert_eq!(fragment.edges[0].from, "");
		assert_eq!(skipped.len(), 4);
		assert!(skipped.contains(&MergeSkip::InvalidAttributes { id: "bad".into() }));
	}
}
