pub mod config;
pub mod events;
pub mod model;
pub mod sys;
pub mod viewmodel;

#[cfg(feature = "gui")]
pub mod gui;
