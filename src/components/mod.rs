pub mod explorer_view;
pub mod graph_canvas;
pub mod sidebar;
