//! BDD step definitions for the history feature

use chrono::TimeDelta;
use cucumber::{given, then, when};

use antarctic_explorer::state::new_state_handle;
use antarctic_explorer::Reading;

use crate::world::ExplorerWorld;

fn parse_values(list: &str) -> Vec<f64> {
    list.split(',')
        .map(|v| {
            v.trim()
                .parse()
                .unwrap_or_else(|_| panic!("Not a number: {}", v))
        })
        .collect()
}

#[given(expr = "a history with capacity {int}")]
fn history_with_capacity(world: &mut ExplorerWorld, capacity: usize) {
    world.state = Some(new_state_handle(capacity).expect("valid capacity"));
}

#[when(regex = r"^the readings (.+) are recorded$")]
async fn readings_recorded(world: &mut ExplorerWorld, list: String) {
    let handle = world.state.as_ref().expect("history not set");
    let mut state = handle.write().await;
    let already = state.generation() as i64;
    for (i, value) in parse_values(&list).into_iter().enumerate() {
        let timestamp = ExplorerWorld::start_time() + TimeDelta::seconds(3 * (already + i as i64));
        state.record(Reading::new(value, timestamp));
    }
}

#[then(regex = r"^the history should contain (.+)$")]
async fn history_contains(world: &mut ExplorerWorld, list: String) {
    let handle = world.state.as_ref().expect("history not set");
    let actual: Vec<f64> = handle
        .read()
        .await
        .snapshot()
        .iter()
        .map(Reading::value)
        .collect();
    assert_eq!(actual, parse_values(&list));
}

#[then("the history should be empty")]
async fn history_empty(world: &mut ExplorerWorld) {
    let handle = world.state.as_ref().expect("history not set");
    assert!(handle.read().await.snapshot().is_empty());
}
