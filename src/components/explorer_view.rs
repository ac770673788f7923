use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, warn};

use super::graph_canvas::{CanvasCommand, CanvasEvent, CanvasFeed, GraphCanvas};
use super::sidebar::{PanelModel, Sidebar, SidebarAction};
use crate::config::ViewerConfig;
use crate::explorer::{Depth, ExplorerSession, GraphSource, PendingFetch, drive};
use crate::remote::{HttpGraphSource, stored_token};

type Session = ExplorerSession<HttpGraphSource>;

/// Routes UI events into the session and pushes the results back out to the
/// canvas and the sidebar signal.
#[derive(Clone)]
struct Controller {
	session: Rc<RefCell<Session>>,
	feed: Rc<CanvasFeed>,
	panel: RwSignal<PanelModel>,
}

impl Controller {
	fn dispatch(&self, op: impl FnOnce(&mut Session) -> Option<PendingFetch>) {
		let pending = op(&mut self.session.borrow_mut());
		self.sync();
		if let Some(pending) = pending {
			let this = self.clone();
			spawn_local(async move {
				let key = pending.key.clone();
				let outcome = drive(this.session.clone(), pending).await;
				debug!("{key}: {outcome:?}");
				this.sync();
			});
		}
	}

	fn sync(&self) {
		let session = self.session.borrow();
		self.feed
			.send(CanvasCommand::Highlight(session.selection().selection().clone()));
		self.panel.set(PanelModel::from_session(&session));
	}

	fn on_canvas(&self, event: CanvasEvent) {
		match event {
			CanvasEvent::Click(hit) => self.dispatch(|s| {
				s.click(&hit);
				None
			}),
			CanvasEvent::DoubleClick(hit) => self.dispatch(|s| s.double_click(&hit)),
			CanvasEvent::Context(hit) => self.dispatch(|s| {
				s.context_click(&hit);
				None
			}),
		}
	}

	fn on_sidebar(&self, action: SidebarAction) {
		match action {
			SidebarAction::SetMode(mode) => self.dispatch(|s| s.set_mode(mode)),
			SidebarAction::SetDepth(value) => {
				let depth = match Depth::new(value) {
					Ok(depth) => depth,
					Err(e) => {
						warn!("{e}");
						return;
					}
				};
				self.dispatch(|s| match s.set_depth(depth) {
					Ok(pending) => pending,
					Err(e) => {
						warn!("{e}");
						None
					}
				});
			}
			SidebarAction::Reset => self.dispatch(|s| reset_and_fit(s, &self.feed)),
			SidebarAction::Refresh => self.dispatch(Session::refresh),
			SidebarAction::Open => self.dispatch(|s| {
				s.open_panel();
				None
			}),
			SidebarAction::Close => self.dispatch(|s| {
				s.close_panel();
				None
			}),
		}
	}
}

/// Resets the graph, recentring the canvas only if that actually started
/// over.
fn reset_and_fit<S: GraphSource>(
	session: &mut ExplorerSession<S>,
	feed: &CanvasFeed,
) -> Option<PendingFetch> {
	let pending = session.reset_graph();
	if pending.is_some() {
		feed.send(CanvasCommand::FitView);
	}
	pending
}

/// The whole viewer: canvas, sidebar and the session behind them.
#[component]
pub fn ExplorerView(config: ViewerConfig) -> impl IntoView {
	let token = stored_token(&config.token_key);
	if token.is_none() {
		debug!("no token under {}; requests go out unauthenticated", config.token_key);
	}
	let source = HttpGraphSource::new(&config, token);
	let session = Rc::new(RefCell::new(ExplorerSession::new(
		source,
		config.initial_mode,
		config.root_node.clone(),
	)));

	let feed = Rc::new(CanvasFeed::default());
	session.borrow_mut().store_mut().subscribe(feed.clone());

	let panel = RwSignal::new(PanelModel::from_session(&session.borrow()));
	let controller = Controller {
		session,
		feed: feed.clone(),
		panel,
	};
	controller.dispatch(Session::start);

	let canvas_events: Rc<dyn Fn(CanvasEvent)> = {
		let c = controller.clone();
		Rc::new(move |event| c.on_canvas(event))
	};
	let sidebar_actions: Rc<dyn Fn(SidebarAction)> =
		Rc::new(move |action| controller.on_sidebar(action));

	view! {
		<div class="explorer">
			<div class="fullscreen-graph">
				<GraphCanvas feed=feed on_event=canvas_events fullscreen=true />
				<div class="graph-overlay">
					<p class="status">{move || panel.with(PanelModel::status_line)}</p>
					<p class="subtitle">
						"Double-click a node to expand. Right-click to inspect. Scroll to zoom."
					</p>
				</div>
			</div>
			<Sidebar panel=panel actions=sidebar_actions />
		</div>
	}
}
