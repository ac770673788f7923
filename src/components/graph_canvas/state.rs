use std::collections::{BTreeMap, HashMap};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use crate::explorer::{Edge, EdgeId, Node, NodeId, PointerHit, Selection, StoreChange};

const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

pub const NODE_RADIUS: f64 = 5.0;
pub const HIT_RADIUS: f64 = 12.0;
pub const EDGE_HIT_WIDTH: f64 = 4.0;
/// Pointer travel (screen px) after which a press is a drag, not a click.
pub const CLICK_SLOP: f64 = 4.0;

/// Stable palette entry for a node group.
pub fn group_color(group: &str) -> &'static str {
	// FNV-1a
	let hash = group
		.bytes()
		.fold(0x811c_9dc5_u32, |h, b| (h ^ b as u32).wrapping_mul(0x0100_0193));
	COLORS[hash as usize % COLORS.len()]
}

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub id: NodeId,
	pub label: String,
	pub color: &'static str,
}

impl NodeInfo {
	fn from_node(node: &Node) -> Self {
		Self {
			id: node.id.clone(),
			label: node.label.clone(),
			color: group_color(&node.group),
		}
	}
}

/// Mirror of one store edge. `ends` is set once both endpoints are drawn.
#[derive(Clone, Debug)]
pub struct CanvasEdge {
	pub id: EdgeId,
	pub label: String,
	pub from: NodeId,
	pub to: NodeId,
	pub ends: Option<(DefaultNodeIdx, DefaultNodeIdx)>,
}

#[derive(Clone, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

fn simulation() -> ForceGraph<NodeInfo, ()> {
	ForceGraph::new(SimulationParameters {
		force_charge: 150.0,
		force_spring: 0.05,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor: 0.9,
	})
}

/// The canvas's own representation of the graph store, reconciled from
/// [`StoreChange`]s.
pub struct GraphCanvasState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub selected: Selection,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	/// Set when the pointer travelled far enough since mousedown.
	pub moved: bool,
	index: HashMap<NodeId, DefaultNodeIdx>,
	edges: BTreeMap<EdgeId, CanvasEdge>,
}

impl GraphCanvasState {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			graph: simulation(),
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			selected: Selection::None,
			width,
			height,
			animation_running: true,
			moved: false,
			index: HashMap::new(),
			edges: BTreeMap::new(),
		}
	}

	pub fn node_count(&self) -> usize {
		self.index.len()
	}

	pub fn edges(&self) -> impl Iterator<Item = &CanvasEdge> {
		self.edges.values()
	}

	pub fn apply(&mut self, change: &StoreChange) {
		match change {
			StoreChange::NodesUpserted(nodes) => {
				for node in nodes {
					self.upsert_node(node);
				}
				self.attach_edges();
			}
			StoreChange::EdgesUpserted(edges) => {
				let mut rewired = false;
				for edge in edges {
					rewired |= self.upsert_edge(edge);
				}
				if rewired {
					self.rebuild();
				} else {
					self.attach_edges();
				}
			}
			StoreChange::NodesRemoved(ids) => {
				for id in ids {
					self.index.remove(id);
				}
				self.rebuild();
			}
			StoreChange::EdgesRemoved(ids) => {
				for id in ids {
					self.edges.remove(id);
				}
				self.rebuild();
			}
			StoreChange::Cleared => self.clear_all(),
		}
	}

	fn upsert_node(&mut self, node: &Node) {
		let info = NodeInfo::from_node(node);
		if let Some(&idx) = self.index.get(&node.id) {
			self.graph.visit_nodes_mut(|n| {
				if n.index() == idx {
					n.data.user_data = info.clone();
				}
			});
			return;
		}
		let (x, y) = self.next_position();
		let idx = self.graph.add_node(NodeData {
			x,
			y,
			mass: 10.0,
			is_anchor: false,
			user_data: info,
		});
		self.index.insert(node.id.clone(), idx);
	}

	/// Returns true when an already drawn edge changed endpoints.
	fn upsert_edge(&mut self, edge: &Edge) -> bool {
		match self.edges.get_mut(&edge.id) {
			Some(existing) => {
				existing.label = edge.label.clone();
				let rewired = existing.from != edge.from || existing.to != edge.to;
				existing.from = edge.from.clone();
				existing.to = edge.to.clone();
				rewired && existing.ends.is_some()
			}
			None => {
				self.edges.insert(
					edge.id.clone(),
					CanvasEdge {
						id: edge.id.clone(),
						label: edge.label.clone(),
						from: edge.from.clone(),
						to: edge.to.clone(),
						ends: None,
					},
				);
				false
			}
		}
	}

	/// Draws edges whose endpoints have both arrived.
	fn attach_edges(&mut self) {
		for edge in self.edges.values_mut().filter(|e| e.ends.is_none()) {
			if let (Some(&src), Some(&tgt)) = (self.index.get(&edge.from), self.index.get(&edge.to)) {
				self.graph.add_edge(src, tgt, EdgeData::default());
				edge.ends = Some((src, tgt));
			}
		}
	}

	/// New nodes start on a ring around the viewport center, sized by how
	/// many nodes are drawn now.
	fn next_position(&self) -> (f32, f32) {
		let slot = self.index.len();
		let angle = (slot as f64) * 2.0 * PI / 12.0;
		let radius = 60.0 + 8.0 * (slot / 12) as f64;
		((radius * angle.cos()) as f32, (radius * angle.sin()) as f32)
	}

	/// Recreates the simulation from the mirrored records, keeping the
	/// position of every surviving node.
	fn rebuild(&mut self) {
		let mut survivors: Vec<(NodeInfo, f32, f32, bool)> = Vec::new();
		self.graph.visit_nodes(|n| {
			if self.index.get(&n.data.user_data.id) == Some(&n.index()) {
				survivors.push((n.data.user_data.clone(), n.x(), n.y(), n.data.is_anchor));
			}
		});

		self.graph = simulation();
		self.index.clear();
		for (info, x, y, is_anchor) in survivors {
			let id = info.id.clone();
			let idx = self.graph.add_node(NodeData {
				x,
				y,
				mass: 10.0,
				is_anchor,
				user_data: info,
			});
			self.index.insert(id, idx);
		}
		for edge in self.edges.values_mut() {
			edge.ends = None;
		}
		self.attach_edges();
		self.drag = DragState::default();
	}

	/// Forget everything drawn.
	pub fn clear_all(&mut self) {
		self.graph = simulation();
		self.index.clear();
		self.edges.clear();
		self.drag = DragState::default();
		self.selected = Selection::None;
	}

	/// Centers and zooms so every node is visible.
	pub fn fit_view(&mut self) {
		let mut bounds: Option<(f64, f64, f64, f64)> = None;
		self.graph.visit_nodes(|n| {
			let (x, y) = (n.x() as f64, n.y() as f64);
			bounds = Some(match bounds {
				None => (x, y, x, y),
				Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
			});
		});
		let Some((x0, y0, x1, y1)) = bounds else {
			self.transform = ViewTransform {
				x: self.width / 2.0,
				y: self.height / 2.0,
				k: 1.0,
			};
			return;
		};
		let pad = 4.0 * HIT_RADIUS;
		let k = (self.width / (x1 - x0 + pad))
			.min(self.height / (y1 - y0 + pad))
			.clamp(0.1, 10.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - (x0 + x1) / 2.0 * k,
			y: self.height / 2.0 - (y0 + y1) / 2.0 * k,
			k,
		};
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn positions(&self) -> HashMap<DefaultNodeIdx, (f64, f64)> {
		let mut positions = HashMap::with_capacity(self.index.len());
		self.graph.visit_nodes(|n| {
			positions.insert(n.index(), (n.x() as f64, n.y() as f64));
		});
		positions
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			// HIT_RADIUS is in world-space, scales with zoom like nodes
			if (dx * dx + dy * dy).sqrt() < HIT_RADIUS {
				found = Some(node.index());
			}
		});
		found
	}

	/// Everything under a screen point, topmost (last drawn) first.
	pub fn hits_at(&self, sx: f64, sy: f64) -> PointerHit {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut hit = PointerHit::default();

		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			if (dx * dx + dy * dy).sqrt() < HIT_RADIUS {
				hit.nodes.push(node.data.user_data.id.clone());
			}
		});
		hit.nodes.reverse();

		let positions = self.positions();
		for edge in self.edges.values() {
			let Some((src, tgt)) = edge.ends else {
				continue;
			};
			if let (Some(&a), Some(&b)) = (positions.get(&src), positions.get(&tgt)) {
				if segment_distance((gx, gy), a, b) < EDGE_HIT_WIDTH {
					hit.edges.push(edge.id.clone());
				}
			}
		}
		hit.edges.reverse();
		hit
	}

	pub fn tick(&mut self, dt: f32) {
		self.graph.update(dt);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

fn segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
	let (dx, dy) = (b.0 - a.0, b.1 - a.1);
	let len2 = dx * dx + dy * dy;
	let t = if len2 < 1e-9 {
		0.0
	} else {
		(((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2).clamp(0.0, 1.0)
	};
	let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
	((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(id: &str, group: &str) -> Node {
		Node {
			id: id.into(),
			label: id.to_uppercase(),
			group: group.into(),
			attributes: Default::default(),
		}
	}

	fn edge(id: &str, from: &str, to: &str) -> Edge {
		Edge {
			id: id.into(),
			label: "rel".into(),
			from: from.into(),
			to: to.into(),
			attributes: Default::default(),
		}
	}

	fn graph_edge_count(state: &GraphCanvasState) -> usize {
		let mut count = 0;
		state.graph.visit_edges(|_, _, _| count += 1);
		count
	}

	fn position_of(state: &GraphCanvasState, id: &str) -> (f32, f32) {
		let mut pos = None;
		state.graph.visit_nodes(|n| {
			if n.data.user_data.id == id {
				pos = Some((n.x(), n.y()));
			}
		});
		pos.unwrap()
	}

	#[test]
	fn test_group_color_is_stable() {
		assert_eq!(group_color("Agent"), group_color("Agent"));
		assert!(COLORS.contains(&group_color("")));
	}

	#[test]
	fn test_dangling_edge_attaches_when_endpoint_arrives() {
		let mut state = GraphCanvasState::new(800.0, 600.0);
		state.apply(&StoreChange::NodesUpserted(vec![node("a", "G")]));
		state.apply(&StoreChange::EdgesUpserted(vec![edge("ab", "a", "b")]));
		assert_eq!(graph_edge_count(&state), 0);

		state.apply(&StoreChange::NodesUpserted(vec![node("b", "G")]));
		assert_eq!(graph_edge_count(&state), 1);
		assert!(state.edges().all(|e| e.ends.is_some()));
	}

	#[test]
	fn test_upsert_updates_in_place() {
		let mut state = GraphCanvasState::new(800.0, 600.0);
		state.apply(&StoreChange::NodesUpserted(vec![node("a", "G")]));
		let mut renamed = node("a", "Other");
		renamed.label = "renamed".into();
		state.apply(&StoreChange::NodesUpserted(vec![renamed]));

		assert_eq!(state.node_count(), 1);
		let mut label = String::new();
		state.graph.visit_nodes(|n| label = n.data.user_data.label.clone());
		assert_eq!(label, "renamed");
	}

	#[test]
	fn test_removal_keeps_survivor_positions() {
		let mut state = GraphCanvasState::new(800.0, 600.0);
		state.apply(&StoreChange::NodesUpserted(vec![
			node("a", "G"),
			node("b", "G"),
			node("c", "G"),
		]));
		state.apply(&StoreChange::EdgesUpserted(vec![
			edge("ab", "a", "b"),
			edge("bc", "b", "c"),
		]));
		let before = position_of(&state, "b");

		state.apply(&StoreChange::EdgesRemoved(vec!["ab".into()]));
		state.apply(&StoreChange::NodesRemoved(vec!["a".into()]));

		assert_eq!(state.node_count(), 2);
		assert_eq!(graph_edge_count(&state), 1);
		assert_eq!(position_of(&state, "b"), before);
	}

	#[test]
	fn test_spawn_ring_shrinks_back_after_prune() {
		let mut state = GraphCanvasState::new(800.0, 600.0);
		let many: Vec<Node> = (0..30).map(|i| node(&format!("n{i}"), "G")).collect();
		state.apply(&StoreChange::NodesUpserted(many));
		let doomed = (1..30).map(|i| format!("n{i}")).collect();
		state.apply(&StoreChange::NodesRemoved(doomed));

		state.apply(&StoreChange::NodesUpserted(vec![node("fresh", "G")]));

		let (x, y) = position_of(&state, "fresh");
		assert!(((x as f64).hypot(y as f64) - 60.0).abs() < 1e-3);
	}

	#[test]
	fn test_hits_prefer_nodes_and_find_edges() {
		let mut state = GraphCanvasState::new(800.0, 600.0);
		state.apply(&StoreChange::NodesUpserted(vec![node("a", "G"), node("b", "G")]));
		state.apply(&StoreChange::EdgesUpserted(vec![edge("ab", "a", "b")]));

		let (ax, ay) = position_of(&state, "a");
		let (bx, by) = position_of(&state, "b");
		let to_screen = |x: f64, y: f64| {
			(
				x * state.transform.k + state.transform.x,
				y * state.transform.k + state.transform.y,
			)
		};

		let (sx, sy) = to_screen(ax as f64, ay as f64);
		let on_node = state.hits_at(sx, sy);
		assert_eq!(on_node.nodes, vec!["a".to_string()]);

		let (mx, my) = to_screen((ax + bx) as f64 / 2.0, (ay + by) as f64 / 2.0);
		let on_edge = state.hits_at(mx, my);
		assert_eq!(on_edge.edges, vec!["ab".to_string()]);
		assert_eq!(on_edge.primary(), Selection::Edge("ab".into()));

		assert!(state.hits_at(-10_000.0, -10_000.0).is_empty());
	}

	#[test]
	fn test_clear_all_and_fit_view() {
		let mut state = GraphCanvasState::new(800.0, 600.0);
		state.apply(&StoreChange::NodesUpserted(vec![node("a", "G"), node("b", "G")]));
		state.fit_view();
		assert!(state.transform.k >= 0.1 && state.transform.k <= 10.0);

		state.apply(&StoreChange::Cleared);
		assert_eq!(state.node_count(), 0);
		assert_eq!(state.edges().count(), 0);
		state.fit_view();
		assert_eq!(state.transform.k, 1.0);
	}

	#[test]
	fn test_segment_distance() {
		assert_eq!(segment_distance((0.0, 1.0), (-1.0, 0.0), (1.0, 0.0)), 1.0);
		assert_eq!(segment_distance((3.0, 0.0), (-1.0, 0.0), (1.0, 0.0)), 2.0);
	}
}
