//! What the operator has picked, and the attribute view over it.

use serde_json::Value;

use super::store::GraphStore;
use super::types::{Attributes, EdgeId, NodeId};

/// Elements under the pointer when an event fired, topmost first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PointerHit {
	/// Node ids, topmost first.
	pub nodes: Vec<NodeId>,
	/// Edge ids, topmost first.
	pub edges: Vec<EdgeId>,
}

impl PointerHit {
	/// A hit on exactly one node.
	pub fn node(id: impl Into<NodeId>) -> Self {
		Self {
			nodes: vec![id.into()],
			edges: Vec::new(),
		}
	}

	/// A hit on exactly one edge.
	pub fn edge(id: impl Into<EdgeId>) -> Self {
		Self {
			nodes: Vec::new(),
			edges: vec![id.into()],
		}
	}

	/// Nothing under the pointer.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.edges.is_empty()
	}

	/// The element a single-selection gesture lands on. The topmost node
	/// wins; edges are only considered when no node was hit.
	pub fn primary(&self) -> Selection {
		if let Some(node) = self.nodes.first() {
			Selection::Node(node.clone())
		} else if let Some(edge) = self.edges.first() {
			Selection::Edge(edge.clone())
		} else {
			Selection::None
		}
	}
}

/// At most one selected element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Selection {
	/// Nothing selected.
	#[default]
	None,
	/// A node, by id.
	Node(NodeId),
	/// An edge, by id.
	Edge(EdgeId),
}

impl Selection {
	/// Whether nothing is selected.
	pub fn is_none(&self) -> bool {
		matches!(self, Self::None)
	}
}

/// The single selected element plus whether the inspection panel is shown.
///
/// Any non-empty selection opens the panel; closing the panel drops the
/// selection.
#[derive(Clone, Debug, Default)]
pub struct SelectionModel {
	selection: Selection,
	panel_open: bool,
}

impl SelectionModel {
	/// The current selection.
	pub fn selection(&self) -> &Selection {
		&self.selection
	}

	/// Whether the inspection panel is shown.
	pub fn is_panel_open(&self) -> bool {
		self.panel_open
	}

	/// Selects a node, replacing any edge selection, and opens the panel.
	pub fn select_node(&mut self, id: impl Into<NodeId>) {
		self.selection = Selection::Node(id.into());
		self.panel_open = true;
	}

	/// Selects an edge, replacing any node selection, and opens the panel.
	pub fn select_edge(&mut self, id: impl Into<EdgeId>) {
		self.selection = Selection::Edge(id.into());
		self.panel_open = true;
	}

	/// Selects nothing. The panel stays as it is.
	pub fn clear_selection(&mut self) {
		self.selection = Selection::None;
	}

	fn select(&mut self, selection: Selection) {
		match selection {
			Selection::Node(id) => self.select_node(id),
			Selection::Edge(id) => self.select_edge(id),
			Selection::None => self.clear_selection(),
		}
	}

	/// Left click: selects [`PointerHit::primary`], or clears on a miss.
	pub fn on_click(&mut self, hit: &PointerHit) {
		self.select(hit.primary());
	}

	/// Context click selects without a prior left-click. Same resolution as
	/// a click; whatever is hit also opens the panel.
	pub fn on_context(&mut self, hit: &PointerHit) {
		self.select(hit.primary());
	}

	/// Shows the panel without changing the selection.
	pub fn open_panel(&mut self) {
		self.panel_open = true;
	}

	/// Hides the panel and drops the selection.
	pub fn close_panel(&mut self) {
		self.panel_open = false;
		self.selection = Selection::None;
	}

	/// Drops the selection if its element is no longer in `store`.
	pub fn retain_existing(&mut self, store: &GraphStore) {
		let present = match &self.selection {
			Selection::None => true,
			Selection::Node(id) => store.contains_node(id),
			Selection::Edge(id) => store.contains_edge(id),
		};
		if !present {
			self.selection = Selection::None;
		}
	}

	/// Attribute view of the selected element.
	pub fn inspect(&self, store: &GraphStore) -> Option<Inspection> {
		match &self.selection {
			Selection::None => None,
			Selection::Node(id) => store.node(id).map(|n| Inspection {
				kind: ElementKind::Node,
				id: n.id.clone(),
				label: n.label.clone(),
				rows: attribute_rows(&n.attributes),
				json: pretty_json(&n.attributes),
			}),
			Selection::Edge(id) => store.edge(id).map(|e| Inspection {
				kind: ElementKind::Edge,
				id: e.id.clone(),
				label: e.label.clone(),
				rows: attribute_rows(&e.attributes),
				json: pretty_json(&e.attributes),
			}),
		}
	}
}

/// Which kind of element an [`Inspection`] describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
	/// A node.
	Node,
	/// An edge.
	Edge,
}

/// One attribute as shown in the table view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeRow {
	/// Attribute name.
	pub key: String,
	/// Strings and numbers verbatim, anything else as pretty JSON.
	pub value: String,
}

/// What the inspection panel shows for the selected element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inspection {
	/// Node or edge.
	pub kind: ElementKind,
	/// Element id.
	pub id: String,
	/// Element label.
	pub label: String,
	/// Sorted by key.
	pub rows: Vec<AttributeRow>,
	/// The whole attribute bag, pretty-printed.
	pub json: String,
}

fn render_value(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		Value::Number(n) => n.to_string(),
		other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
	}
}

fn attribute_rows(attributes: &Attributes) -> Vec<AttributeRow> {
	let mut rows: Vec<AttributeRow> = attributes
		.iter()
		.map(|(key, value)| AttributeRow {
			key: key.clone(),
			value: render_value(value),
		})
		.collect();
	rows.sort_by(|a, b| a.key.cmp(&b.key));
	rows
}

fn pretty_json(attributes: &Attributes) -> String {
	serde_json::to_string_pretty(attributes).unwrap_or_default()
}
