mod component;
mod feed;
mod render;
mod state;

pub use component::{CanvasEvent, GraphCanvas};
pub use feed::{CanvasCommand, CanvasFeed};

#[cfg(test)]
pub(crate) use state::GraphCanvasState;
