//! BDD step definitions for the antarctic explorer service

pub mod config_steps;
pub mod history_steps;
pub mod view_steps;
