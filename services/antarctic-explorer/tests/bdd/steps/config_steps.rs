//! BDD step definitions for the configuration feature

use cucumber::{given, then, when};

use antarctic_explorer::{Config, ExplorerError};

use crate::world::ExplorerWorld;

#[given("the default configuration")]
fn default_configuration(world: &mut ExplorerWorld) {
    world.config = Some(Config::default());
}

#[when(expr = "the history capacity is set to {int}")]
fn set_capacity(world: &mut ExplorerWorld, capacity: usize) {
    world.config.as_mut().expect("config not set").history.capacity = capacity;
}

#[when(expr = "the refresh interval is set to {int} seconds")]
fn set_refresh_interval(world: &mut ExplorerWorld, seconds: u64) {
    world
        .config
        .as_mut()
        .expect("config not set")
        .generator
        .refresh_interval_seconds = seconds;
}

#[when(expr = "the configuration {string} is loaded")]
fn configuration_loaded(world: &mut ExplorerWorld, json: String) {
    match serde_json::from_str::<Config>(&json) {
        Ok(config) => world.config = Some(config),
        Err(e) => world.config_error = Some(ExplorerError::from(e).to_string()),
    }
}

#[then("the configuration should be valid")]
fn configuration_valid(world: &mut ExplorerWorld) {
    let config = world.config.as_ref().expect("config not set");
    assert!(config.validate().is_ok());
}

#[then(expr = "the configuration should be rejected mentioning {string}")]
fn configuration_rejected(world: &mut ExplorerWorld, fragment: String) {
    let message = match world.config_error.clone() {
        Some(message) => message,
        None => world
            .config
            .as_ref()
            .expect("config not set")
            .validate()
            .expect_err("configuration was accepted")
            .to_string(),
    };
    assert!(
        message.contains(&fragment),
        "Expected error mentioning '{}', got '{}'",
        fragment,
        message
    );
}
