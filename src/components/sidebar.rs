use std::rc::Rc;

use leptos::prelude::*;

use crate::explorer::{ExplorerSession, FetchStatus, GraphSource, Inspection, TraversalMode};

/// Snapshot of the session shown by the sidebar. Plain data so it can live
/// in a signal.
#[derive(Clone, Debug, PartialEq)]
pub struct PanelModel {
	pub mode: TraversalMode,
	pub depth: u8,
	pub open: bool,
	pub inspection: Option<Inspection>,
	pub status: FetchStatus,
	pub nodes: usize,
	pub edges: usize,
}

impl PanelModel {
	pub fn from_session<S: GraphSource>(session: &ExplorerSession<S>) -> Self {
		let traversal = session.traversal();
		Self {
			mode: traversal.mode,
			depth: traversal.depth.get(),
			open: session.selection().is_panel_open(),
			inspection: session.inspect(),
			status: session.status().clone(),
			nodes: session.store().node_count(),
			edges: session.store().edge_count(),
		}
	}

	pub fn status_line(&self) -> String {
		match &self.status {
			FetchStatus::Idle => format!("{} nodes · {} edges", self.nodes, self.edges),
			FetchStatus::Loading => "Loading…".to_owned(),
			FetchStatus::Failed(reason) => format!("Fetch failed: {reason}"),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SidebarAction {
	SetMode(TraversalMode),
	SetDepth(u8),
	Reset,
	Refresh,
	Open,
	Close,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ObjectView {
	Table,
	Json,
}

fn display(visible: bool, shown: &'static str) -> &'static str {
	if visible { shown } else { "none" }
}

#[component]
pub fn Sidebar(panel: RwSignal<PanelModel>, actions: Rc<dyn Fn(SidebarAction)>) -> impl IntoView {
	let (object_view, set_object_view) = signal(ObjectView::Table);

	let act_open = actions.clone();
	let act_close = actions.clone();
	let act_mode = actions.clone();
	let act_depth = actions.clone();
	let act_reset = actions.clone();
	let act_refresh = actions;

	let modes = TraversalMode::ALL
		.into_iter()
		.map(|mode| {
			view! {
				<option value=mode.as_str() selected=move || panel.with(|p| p.mode == mode)>
					{mode.as_str()}
				</option>
			}
		})
		.collect_view();

	view! {
		<button
			class="open-sidebar"
			title="Open Sidebar"
			style:display=move || display(!panel.with(|p| p.open), "block")
			on:click=move |_| act_open(SidebarAction::Open)
		>
			"☰"
		</button>

		<aside class="sidebar" style:display=move || display(panel.with(|p| p.open), "flex")>
			<header class="sidebar-header">
				<h5>"JIVAS Graph"</h5>
				<button class="close" on:click=move |_| act_close(SidebarAction::Close)>
					"×"
				</button>
			</header>

			<p class="section-title">"Controls"</p>
			<label>
				"Traversal Mode"
				<select on:change=move |ev| {
					if let Some(mode) = TraversalMode::parse(&event_target_value(&ev)) {
						act_mode(SidebarAction::SetMode(mode));
					}
				}>{modes}</select>
			</label>

			<div
				class="incremental-controls"
				style:display=move || display(panel.with(|p| p.mode.is_incremental()), "block")
			>
				<label>
					"Depth"
					<input
						type="range"
						min="1"
						max="10"
						list="depth-marks"
						prop:value=move || panel.with(|p| p.depth.to_string())
						on:change=move |ev| {
							if let Ok(depth) = event_target_value(&ev).parse::<u8>() {
								act_depth(SidebarAction::SetDepth(depth));
							}
						}
					/>
					<span class="depth-value">{move || panel.with(|p| p.depth)}</span>
				</label>
				<datalist id="depth-marks">
					<option value="1" label="1"></option>
					<option value="5" label="5"></option>
					<option value="10" label="10"></option>
				</datalist>
				<div class="buttons">
					<button on:click=move |_| act_refresh(SidebarAction::Refresh)>"Refresh"</button>
					<button on:click=move |_| act_reset(SidebarAction::Reset)>"Reset Graph"</button>
				</div>
			</div>

			<div class="object-header">
				<p class="section-title">"Object Information"</p>
				<div class="segmented">
					<button
						class:active=move || object_view.get() == ObjectView::Json
						on:click=move |_| set_object_view.set(ObjectView::Json)
					>
						"JSON"
					</button>
					<button
						class:active=move || object_view.get() == ObjectView::Table
						on:click=move |_| set_object_view.set(ObjectView::Table)
					>
						"Table"
					</button>
				</div>
			</div>

			<p class="object-title">
				{move || {
					panel
						.with(|p| {
							p.inspection.as_ref().map(|i| format!("{:?} {} ({})", i.kind, i.label, i.id))
						})
						.unwrap_or_default()
				}}
			</p>

			<table
				class="attributes"
				style:display=move || display(object_view.get() == ObjectView::Table, "table")
			>
				<tbody>
					{move || {
						panel
							.with(|p| p.inspection.as_ref().map(|i| i.rows.clone()))
							.unwrap_or_default()
							.into_iter()
							.map(|row| {
								view! {
									<tr>
										<th>{row.key}</th>
										<td>
											<pre>{row.value}</pre>
										</td>
									</tr>
								}
							})
							.collect_view()
					}}
				</tbody>
			</table>

			<pre
				class="attributes-json"
				style:display=move || display(object_view.get() == ObjectView::Json, "block")
			>
				{move || panel.with(|p| p.inspection.as_ref().map(|i| i.json.clone())).unwrap_or_default()}
			</pre>
		</aside>
	}
}
