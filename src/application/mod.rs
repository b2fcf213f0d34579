// Application layer - use cases and the traits at the crate's seams
pub mod axis_mapper;
pub mod chart_manager;
pub mod data_source;
pub mod panel;
pub mod refresh_scheduler;
pub mod render_adapter;
pub mod transform;
