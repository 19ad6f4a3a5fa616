pub mod app;
pub mod classifier;
pub mod common;
pub mod menu;
pub mod model;
pub mod registry;
pub mod render;
pub mod store;
pub mod sys;
