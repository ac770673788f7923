//! Traversal state machine.
//!
//! Each triggering event has one transition function returning the next
//! [`TraversalState`] together with what must happen to the store and
//! whether a fetch is needed. Nothing here touches the store directly.

use std::fmt;

use super::error::TraversalError;
use super::types::NodeId;

/// Governs both the fetch shape and the merge policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TraversalMode {
	/// Whole graph reachable from the root in one call; never pruned.
	Full,
	/// Neighborhood of the focus node; the store only grows.
	#[default]
	Step,
	/// Neighborhood of the focus node; everything else is pruned.
	Focus,
}

impl TraversalMode {
	/// Every mode, in selector order.
	pub const ALL: [TraversalMode; 3] = [Self::Full, Self::Step, Self::Focus];

	/// Display name, also accepted by [`Self::parse`].
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Full => "Full",
			Self::Step => "Step",
			Self::Focus => "Focus",
		}
	}

	/// Case-insensitive inverse of [`Self::as_str`].
	pub fn parse(s: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|m| m.as_str().eq_ignore_ascii_case(s))
	}

	/// Step and Focus fetch neighborhoods, so depth and reset apply to them.
	pub fn is_incremental(self) -> bool {
		!matches!(self, Self::Full)
	}
}

impl fmt::Display for TraversalMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Neighborhood radius in hops, always within [`Depth::MIN`]..=[`Depth::MAX`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Depth(u8);

impl Depth {
	/// Smallest depth, and the one every rewind returns to.
	pub const MIN: Depth = Depth(1);
	/// Largest depth.
	pub const MAX: Depth = Depth(10);

	/// Checks `depth` against the allowed range.
	pub fn new(depth: u8) -> Result<Self, TraversalError> {
		if (Self::MIN.0..=Self::MAX.0).contains(&depth) {
			Ok(Self(depth))
		} else {
			Err(TraversalError::DepthOutOfRange { depth })
		}
	}

	/// The raw hop count.
	pub fn get(self) -> u8 {
		self.0
	}
}

impl Default for Depth {
	fn default() -> Self {
		Self::MIN
	}
}

/// Identifies what a fetch retrieves. Full ignores focus and depth.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FetchKey {
	/// The whole graph under a root.
	Full {
		/// Root node id.
		root: NodeId,
	},
	/// One neighborhood in Step or Focus mode.
	Neighborhood {
		/// Step or Focus; part of the key so a mode switch never reuses a
		/// result.
		mode: TraversalMode,
		/// Root node id.
		root: NodeId,
		/// Node whose neighborhood is fetched.
		focus: NodeId,
		/// Hops out from `focus`.
		depth: Depth,
	},
}

impl fmt::Display for FetchKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Full { root } => write!(f, "Full({root})"),
			Self::Neighborhood {
				mode,
				root,
				focus,
				depth,
			} => write!(f, "{mode}({root}, {focus}, {})", depth.get()),
		}
	}
}

/// Where the exploration currently stands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraversalState {
	/// Active mode.
	pub mode: TraversalMode,
	/// Configured starting node; never changes during a session.
	pub root: NodeId,
	/// Node whose neighborhood is requested.
	pub focus: NodeId,
	/// Neighborhood radius.
	pub depth: Depth,
}

/// What a transition requires of the store before any fetch result lands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreEffect {
	/// Leave the store alone.
	Keep,
	/// Empty the store.
	Clear,
	/// Remove everything except this node.
	PruneExcept(NodeId),
}

/// Whether a transition needs data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchDirective {
	/// No data needed.
	None,
	/// Fetch `key`, reusing a cached or in-flight result for the same key.
	Fetch(FetchKey),
	/// Drop whatever is cached and fetch `key` again.
	Refetch(FetchKey),
}

/// Result of one transition function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
	/// State to adopt.
	pub next: TraversalState,
	/// Store change to apply right away.
	pub store: StoreEffect,
	/// Fetch to request afterwards.
	pub fetch: FetchDirective,
}

impl TraversalState {
	/// Focused on `root` at depth 1.
	pub fn new(mode: TraversalMode, root: impl Into<NodeId>) -> Self {
		let root = root.into();
		Self {
			mode,
			focus: root.clone(),
			root,
			depth: Depth::MIN,
		}
	}

	/// The key describing what this state wants fetched.
	pub fn fetch_key(&self) -> FetchKey {
		match self.mode {
			TraversalMode::Full => FetchKey::Full {
				root: self.root.clone(),
			},
			mode => FetchKey::Neighborhood {
				mode,
				root: self.root.clone(),
				focus: self.focus.clone(),
				depth: self.depth,
			},
		}
	}

	/// Whether a merge under this state replaces the store with the fragment
	/// (plus the focus), rather than adding to it.
	pub fn prunes(&self) -> bool {
		self.mode == TraversalMode::Focus
	}

	fn unchanged(&self) -> Transition {
		Transition {
			next: self.clone(),
			store: StoreEffect::Keep,
			fetch: FetchDirective::None,
		}
	}

	fn rewound(&self, mode: TraversalMode) -> TraversalState {
		TraversalState::new(mode, self.root.clone())
	}

	/// Session start: fetch whatever the initial state describes.
	pub fn on_start(&self) -> Transition {
		Transition {
			next: self.clone(),
			store: StoreEffect::Keep,
			fetch: FetchDirective::Fetch(self.fetch_key()),
		}
	}

	/// Switching mode wipes the store and starts over from the root.
	pub fn on_mode_change(&self, mode: TraversalMode) -> Transition {
		if mode == self.mode {
			return self.unchanged();
		}
		let next = self.rewound(mode);
		Transition {
			fetch: FetchDirective::Refetch(next.fetch_key()),
			store: StoreEffect::Clear,
			next,
		}
	}

	/// Double-click on a node advances the focus to it.
	pub fn on_node_double_click(&self, node: &str) -> Transition {
		let mut next = self.clone();
		next.focus = node.to_owned();
		match self.mode {
			TraversalMode::Full => Transition {
				next,
				store: StoreEffect::Keep,
				fetch: FetchDirective::None,
			},
			TraversalMode::Step => Transition {
				fetch: FetchDirective::Fetch(next.fetch_key()),
				store: StoreEffect::Keep,
				next,
			},
			TraversalMode::Focus => Transition {
				fetch: FetchDirective::Fetch(next.fetch_key()),
				store: StoreEffect::PruneExcept(node.to_owned()),
				next,
			},
		}
	}

	/// New neighborhood radius around the current focus. Existing store
	/// contents are kept.
	pub fn on_depth_change(&self, depth: Depth) -> Result<Transition, TraversalError> {
		if !self.mode.is_incremental() {
			return Err(TraversalError::DepthUnavailable { mode: self.mode });
		}
		if depth == self.depth {
			return Ok(self.unchanged());
		}
		let mut next = self.clone();
		next.depth = depth;
		Ok(Transition {
			fetch: FetchDirective::Fetch(next.fetch_key()),
			store: StoreEffect::Keep,
			next,
		})
	}

	/// "Reset Graph": back to the root at depth 1. Nothing to do in Full
	/// mode, or when the store holds a single node.
	pub fn on_reset(&self, stored_nodes: usize) -> Transition {
		if !self.mode.is_incremental() || stored_nodes == 1 {
			return self.unchanged();
		}
		let next = self.rewound(self.mode);
		Transition {
			fetch: FetchDirective::Refetch(next.fetch_key()),
			store: StoreEffect::Clear,
			next,
		}
	}

	/// Re-issue the current key regardless of what is cached.
	pub fn on_refresh(&self) -> Transition {
		Transition {
			next: self.clone(),
			store: StoreEffect::Keep,
			fetch: FetchDirective::Refetch(self.fetch_key()),
		}
	}
}
