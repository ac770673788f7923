//! The graph store and its change notifications.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use super::types::{Edge, EdgeId, GraphFragment, Node, NodeId};

/// A completed store mutation, as seen by observers.
///
/// Upserts carry the full records so a renderer can reconcile without
/// reading back from the store.
#[derive(Clone, Debug, PartialEq)]
pub enum StoreChange {
	/// Nodes inserted or replaced.
	NodesUpserted(Vec<Node>),
	/// Edges inserted or replaced.
	EdgesUpserted(Vec<Edge>),
	/// Nodes removed, by id.
	NodesRemoved(Vec<NodeId>),
	/// Edges removed, by id. Sent before the [`Self::NodesRemoved`] of the
	/// same removal.
	EdgesRemoved(Vec<EdgeId>),
	/// Everything removed.
	Cleared,
}

/// Anything that mirrors the store, typically a rendering surface.
pub trait StoreObserver {
	/// Called synchronously after each mutation.
	fn store_changed(&self, change: &StoreChange);
}

/// Handle returned by [`GraphStore::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// Everything discovered so far, keyed by id with upsert semantics.
#[derive(Default)]
pub struct GraphStore {
	nodes: BTreeMap<NodeId, Node>,
	edges: BTreeMap<EdgeId, Edge>,
	observers: Vec<(SubscriptionId, Rc<dyn StoreObserver>)>,
	next_subscription: u64,
}

impl GraphStore {
	/// An empty store with no observers.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers an observer for every later mutation.
	pub fn subscribe(&mut self, observer: Rc<dyn StoreObserver>) -> SubscriptionId {
		let id = SubscriptionId(self.next_subscription);
		self.next_subscription += 1;
		self.observers.push((id, observer));
		id
	}

	/// Stops notifying the observer registered under `id`.
	pub fn unsubscribe(&mut self, id: SubscriptionId) {
		self.observers.retain(|(sub, _)| *sub != id);
	}

	fn notify(&self, change: StoreChange) {
		for (_, observer) in &self.observers {
			observer.store_changed(&change);
		}
	}

	/// Node by id.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.nodes.get(id)
	}

	/// Edge by id.
	pub fn edge(&self, id: &str) -> Option<&Edge> {
		self.edges.get(id)
	}

	/// Whether a node with `id` is stored.
	pub fn contains_node(&self, id: &str) -> bool {
		self.nodes.contains_key(id)
	}

	/// Whether an edge with `id` is stored.
	pub fn contains_edge(&self, id: &str) -> bool {
		self.edges.contains_key(id)
	}

	/// All nodes, ordered by id.
	pub fn nodes(&self) -> impl Iterator<Item = &Node> {
		self.nodes.values()
	}

	/// All edges, ordered by id.
	pub fn edges(&self) -> impl Iterator<Item = &Edge> {
		self.edges.values()
	}

	/// Number of stored nodes.
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	/// Number of stored edges.
	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	/// Whether nothing at all is stored.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.edges.is_empty()
	}

	/// Inserts new nodes and replaces existing ones with the same id.
	pub fn upsert_nodes(&mut self, nodes: Vec<Node>) {
		if nodes.is_empty() {
			return;
		}
		for node in &nodes {
			self.nodes.insert(node.id.clone(), node.clone());
		}
		self.notify(StoreChange::NodesUpserted(nodes));
	}

	/// Same as [`Self::upsert_nodes`]; endpoints need not be present yet.
	pub fn upsert_edges(&mut self, edges: Vec<Edge>) {
		if edges.is_empty() {
			return;
		}
		for edge in &edges {
			self.edges.insert(edge.id.clone(), edge.clone());
		}
		self.notify(StoreChange::EdgesUpserted(edges));
	}

	/// Upserts the fragment's nodes, then its edges.
	pub fn merge(&mut self, fragment: &GraphFragment) {
		self.upsert_nodes(fragment.nodes.clone());
		self.upsert_edges(fragment.edges.clone());
	}

	/// Removes every node but `keep_id`, and every edge that is not a loop
	/// on it. Dangling edges go too, so nothing outlives the cut.
	pub fn remove_nodes_except(&mut self, keep_id: &str) {
		let nodes = BTreeSet::from([keep_id.to_owned()]);
		let edges = self
			.edges
			.values()
			.filter(|e| e.from == keep_id && e.to == keep_id)
			.map(|e| e.id.clone())
			.collect();
		self.retain_only(&nodes, &edges);
	}

	/// Keeps exactly the listed nodes and edges. Anything else is removed,
	/// whether or not it is connected to what stays.
	pub fn retain_only(&mut self, nodes: &BTreeSet<NodeId>, edges: &BTreeSet<EdgeId>) {
		let doomed: Vec<NodeId> = self
			.nodes
			.keys()
			.filter(|id| !nodes.contains(*id))
			.cloned()
			.collect();
		let dead_edges: Vec<EdgeId> = self
			.edges
			.keys()
			.filter(|id| !edges.contains(*id))
			.cloned()
			.collect();

		for id in &dead_edges {
			self.edges.remove(id);
		}
		for id in &doomed {
			self.nodes.remove(id);
		}
		if !dead_edges.is_empty() {
			self.notify(StoreChange::EdgesRemoved(dead_edges));
		}
		if !doomed.is_empty() {
			self.notify(StoreChange::NodesRemoved(doomed));
		}
	}

	/// Removes everything.
	pub fn clear(&mut self) {
		self.nodes.clear();
		self.edges.clear();
		self.notify(StoreChange::Cleared);
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use std::cell::RefCell;

	use super::*;

	pub(crate) fn node(id: &str) -> Node {
		Node {
			id: id.into(),
			label: format!("label-{id}"),
			group: "G".into(),
			attributes: Default::default(),
		}
	}

	pub(crate) fn edge(id: &str, from: &str, to: &str) -> Edge {
		Edge {
			id: id.into(),
			label: "rel".into(),
			from: from.into(),
			to: to.into(),
			attributes: Default::default(),
		}
	}

	#[derive(Default)]
	struct Recorder(RefCell<Vec<StoreChange>>);

	impl StoreObserver for Recorder {
		fn store_changed(&self, change: &StoreChange) {
			self.0.borrow_mut().push(change.clone());
		}
	}

	fn ids(store: &GraphStore) -> (Vec<String>, Vec<String>) {
		(
			store.nodes().map(|n| n.id.clone()).collect(),
			store.edges().map(|e| e.id.clone()).collect(),
		)
	}

	#[test]
	fn test_upsert_is_idempotent() {
		let fragment = GraphFragment {
			nodes: vec![node("n1"), node("n2")],
			edges: vec![edge("e1", "n1", "n2")],
		};
		let mut once = GraphStore::new();
		once.merge(&fragment);
		let mut twice = GraphStore::new();
		twice.merge(&fragment);
		twice.merge(&fragment);

		assert_eq!(ids(&once), ids(&twice));
		assert_eq!(twice.node_count(), 2);
		assert_eq!(twice.edge_count(), 1);
	}

	#[test]
	fn test_upsert_replaces_existing_record() {
		let mut store = GraphStore::new();
		store.upsert_nodes(vec![node("n1")]);
		let mut renamed = node("n1");
		renamed.label = "renamed".into();
		store.upsert_nodes(vec![renamed]);

		assert_eq!(store.node_count(), 1);
		assert_eq!(store.node("n1").unwrap().label, "renamed");
	}

	#[test]
	fn test_dangling_edge_is_tolerated() {
		let mut store = GraphStore::new();
		store.upsert_edges(vec![edge("e1", "n1", "ghost")]);
		assert!(store.contains_edge("e1"));
		assert_eq!(store.node_count(), 0);
	}

	#[test]
	fn test_remove_nodes_except_leaves_only_the_kept_node() {
		let mut store = GraphStore::new();
		store.upsert_nodes(vec![node("n1"), node("n2"), node("n3")]);
		store.upsert_edges(vec![
			edge("e1", "n1", "n2"),
			edge("e2", "n2", "n3"),
			edge("e3", "n2", "unknown"),
			edge("bad", "", ""),
			edge("loop", "n2", "n2"),
		]);

		store.remove_nodes_except("n2");

		assert_eq!(ids(&store), (vec!["n2".into()], vec!["loop".into()]));
	}

	#[test]
	fn test_retain_only_ignores_connectivity() {
		let mut store = GraphStore::new();
		store.upsert_nodes(vec![node("a"), node("b"), node("island"), node("old")]);
		store.upsert_edges(vec![edge("ab", "a", "b"), edge("old-a", "old", "a")]);

		store.retain_only(
			&BTreeSet::from(["a".to_owned(), "island".to_owned()]),
			&BTreeSet::from(["ab".to_owned()]),
		);

		let (nodes, edges) = ids(&store);
		assert_eq!(nodes, vec!["a", "island"]);
		// Kept even though its far end is gone.
		assert_eq!(edges, vec!["ab"]);
	}

	#[test]
	fn test_retain_only_with_nothing_to_drop_is_silent() {
		let recorder = Rc::new(Recorder::default());
		let mut store = GraphStore::new();
		store.upsert_nodes(vec![node("a")]);
		store.subscribe(recorder.clone());

		store.retain_only(&BTreeSet::from(["a".to_owned()]), &BTreeSet::new());

		assert!(recorder.0.borrow().is_empty());
		assert!(store.contains_node("a"));
	}

	#[test]
	fn test_observers_see_every_mutation() {
		let recorder = Rc::new(Recorder::default());
		let mut store = GraphStore::new();
		let sub = store.subscribe(recorder.clone());

		store.upsert_nodes(vec![node("n1"), node("n2")]);
		store.upsert_edges(vec![edge("e1", "n1", "n2")]);
		store.remove_nodes_except("n1");
		store.clear();
		store.unsubscribe(sub);
		store.upsert_nodes(vec![node("late")]);

		let seen = recorder.0.borrow();
		assert_eq!(seen.len(), 5);
		assert_eq!(seen[2], StoreChange::EdgesRemoved(vec!["e1".into()]));
		assert_eq!(seen[3], StoreChange::NodesRemoved(vec!["n2".into()]));
		assert_eq!(seen[4], StoreChange::Cleared);
	}

	#[test]
	fn test_empty_upsert_does_not_notify() {
		let recorder = Rc::new(Recorder::default());
		let mut store = GraphStore::new();
		store.subscribe(recorder.clone());
		store.upsert_nodes(Vec::new());
		store.upsert_edges(Vec::new());
		assert!(recorder.0.borrow().is_empty());
	}
}
