//! Fetch coordination.
//!
//! The coordinator owns one logical slot. Requests for the key already in
//! the slot share its future (in flight) or its result (completed); any
//! other key supersedes the slot. Every issued fetch carries a generation
//! number so that a late result for a superseded slot can be recognised and
//! dropped.

use std::rc::Rc;

use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};
use log::{debug, warn};

use super::error::FetchError;
use super::traversal::{Depth, FetchKey};
use super::types::{GraphFragment, RawFragment};

/// Remote side of the explorer: where fragments come from.
///
/// Returned futures must not borrow `self`; implementations clone whatever
/// they need into the future.
pub trait GraphSource {
	/// Everything reachable from `root`, in one call.
	fn fetch_full_graph(&self, root: &str) -> LocalBoxFuture<'static, Result<RawFragment, FetchError>>;

	/// The neighborhood of `focus`, `depth` hops out.
	fn fetch_neighborhood(
		&self,
		focus: &str,
		depth: Depth,
	) -> LocalBoxFuture<'static, Result<RawFragment, FetchError>>;
}

/// Result shared by every waiter of one fetch.
pub type FetchOutcome = Result<Rc<GraphFragment>, FetchError>;

type SharedFetch = Shared<LocalBoxFuture<'static, FetchOutcome>>;

/// How a request was satisfied.
#[derive(Clone, Debug)]
pub enum Disposition {
	/// A new remote call was made; the caller should await and merge it.
	Issued,
	/// The same key is already in flight; its issuer will merge.
	Coalesced,
	/// The same key already completed; merge this right away.
	Cached(Rc<GraphFragment>),
}

/// Ticket for one request against the coordinator.
#[derive(Clone)]
pub struct PendingFetch {
	/// What was asked for.
	pub key: FetchKey,
	/// Slot generation the ticket belongs to.
	pub generation: u64,
	/// How the request was satisfied.
	pub disposition: Disposition,
	future: SharedFetch,
}

impl PendingFetch {
	/// Waits for the shared outcome of this ticket's fetch.
	pub async fn outcome(&self) -> FetchOutcome {
		self.future.clone().await
	}
}

struct Slot {
	key: FetchKey,
	generation: u64,
	future: SharedFetch,
}

/// Holds at most one current fetch per session.
pub struct FetchCoordinator<S> {
	source: S,
	slot: Option<Slot>,
	generation: u64,
}

impl<S: GraphSource> FetchCoordinator<S> {
	/// An empty coordinator over `source`.
	pub fn new(source: S) -> Self {
		Self {
			source,
			slot: None,
			generation: 0,
		}
	}

	/// The wrapped source.
	pub fn source(&self) -> &S {
		&self.source
	}

	/// Key of the fetch currently held, if any.
	pub fn current_key(&self) -> Option<&FetchKey> {
		self.slot.as_ref().map(|s| &s.key)
	}

	/// Returns a ticket for `key`, issuing a remote call only when nothing
	/// usable is held for it.
	pub fn request(&mut self, key: FetchKey) -> PendingFetch {
		if let Some(slot) = self.slot.as_ref().filter(|s| s.key == key) {
			let reuse = match slot.future.peek() {
				None => Some(Disposition::Coalesced),
				Some(Ok(fragment)) => Some(Disposition::Cached(fragment.clone())),
				// A failed fetch is retried by the next request.
				Some(Err(_)) => None,
			};
			if let Some(disposition) = reuse {
				debug!("fetch {key}: reusing generation {} ({disposition:?})", slot.generation);
				return PendingFetch {
					key,
					generation: slot.generation,
					disposition,
					future: slot.future.clone(),
				};
			}
		}
		self.issue(key)
	}

	/// Drops the slot so the next request issues a new call, and makes any
	/// in-flight result stale.
	pub fn invalidate(&mut self) {
		if let Some(slot) = self.slot.take() {
			debug!("fetch {}: invalidated generation {}", slot.key, slot.generation);
		}
		self.generation += 1;
	}

	/// Whether a ticket still describes the newest intent.
	pub fn is_current(&self, pending: &PendingFetch) -> bool {
		self.slot
			.as_ref()
			.is_some_and(|s| s.generation == pending.generation && s.key == pending.key)
	}

	fn issue(&mut self, key: FetchKey) -> PendingFetch {
		self.generation += 1;
		let generation = self.generation;
		debug!("fetch {key}: issuing generation {generation}");

		let raw = match &key {
			FetchKey::Full { root } => self.source.fetch_full_graph(root),
			FetchKey::Neighborhood { focus, depth, .. } => {
				self.source.fetch_neighborhood(focus, *depth)
			}
		};
		let future = async move {
			let (fragment, skipped) = GraphFragment::normalize(raw.await?);
			for skip in &skipped {
				warn!("skipped record: {skip}");
			}
			Ok::<_, FetchError>(Rc::new(fragment))
		}
		.boxed_local()
		.shared();

		self.slot = Some(Slot {
			key: key.clone(),
			generation,
			future: future.clone(),
		});
		PendingFetch {
			key,
			generation,
			disposition: Disposition::Issued,
			future,
		}
	}
}
