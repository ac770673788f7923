use std::cell::RefCell;
use std::collections::VecDeque;

use super::state::GraphCanvasState;
use crate::explorer::{Selection, StoreChange, StoreObserver};

/// Commands the rest of the app can send to the canvas. Clearing is not one
/// of them: it follows [`StoreChange::Cleared`].
#[derive(Clone, Debug, PartialEq)]
pub enum CanvasCommand {
	FitView,
	Highlight(Selection),
}

#[derive(Clone, Debug, PartialEq)]
enum FeedItem {
	Change(StoreChange),
	Command(CanvasCommand),
}

/// Queue between the store (and app) and the canvas.
///
/// The store notifies synchronously; the canvas drains before every frame
/// and before handling pointer input, so it never acts on an outdated view.
#[derive(Default)]
pub struct CanvasFeed {
	queue: RefCell<VecDeque<FeedItem>>,
}

impl CanvasFeed {
	pub fn send(&self, command: CanvasCommand) {
		self.queue.borrow_mut().push_back(FeedItem::Command(command));
	}

	pub fn drain_into(&self, state: &mut GraphCanvasState) {
		let items: Vec<FeedItem> = self.queue.borrow_mut().drain(..).collect();
		for item in items {
			match item {
				FeedItem::Change(change) => state.apply(&change),
				FeedItem::Command(CanvasCommand::FitView) => state.fit_view(),
				FeedItem::Command(CanvasCommand::Highlight(selection)) => {
					state.selected = selection
				}
			}
		}
	}
}

impl StoreObserver for CanvasFeed {
	fn store_changed(&self, change: &StoreChange) {
		self.queue
			.borrow_mut()
			.push_back(FeedItem::Change(change.clone()));
	}
}
