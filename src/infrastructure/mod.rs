// Infrastructure layer - concrete backends, data sources, and configuration
pub mod adapter_factory;
pub mod canvas_adapter;
pub mod config;
pub mod grammar_adapter;
pub mod memory_source;
pub mod rest_source;
