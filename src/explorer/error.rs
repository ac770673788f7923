//! Error types for the explorer core.
//!
//! None of these are fatal: fetch failures become a session status, skipped
//! records are logged, and traversal errors reject a single user action.

use thiserror::Error;

use super::traversal::TraversalMode;

/// A remote fetch that did not produce a fragment.
///
/// `Clone` because one outcome is shared by every waiter of a coalesced fetch.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FetchError {
	/// The request never produced a response.
	#[error("request failed: {0}")]
	Transport(String),

	/// Non-success HTTP status.
	#[error("server responded with status {code}")]
	Status {
		/// The HTTP status code.
		code: u16,
	},

	/// The body was not the expected JSON.
	#[error("could not decode response: {0}")]
	Decode(String),

	/// The `reports` array was missing or empty.
	#[error("response carried no report")]
	EmptyReport,
}

/// One raw record dropped while normalizing a fragment.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MergeSkip {
	/// The record has no usable id.
	#[error("{record} record without an id")]
	MissingId {
		/// `"node"` or `"edge"`.
		record: &'static str,
	},

	/// The record does not have the node or edge shape.
	#[error("malformed {record} record: {reason}")]
	Malformed {
		/// `"node"` or `"edge"`.
		record: &'static str,
		/// Deserializer message.
		reason: String,
	},

	/// `data` is present but not a JSON object.
	#[error("attributes of {id} are not an object")]
	InvalidAttributes {
		/// Id of the offending record.
		id: String,
	},
}

/// A traversal action that was rejected.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TraversalError {
	/// Requested depth is outside the slider range.
	#[error("depth {depth} is outside 1..=10")]
	DepthOutOfRange {
		/// The rejected value.
		depth: u8,
	},

	/// Depth only applies to incremental modes.
	#[error("depth cannot be changed in {mode} mode")]
	DepthUnavailable {
		/// The mode that was active.
		mode: TraversalMode,
	},
}
