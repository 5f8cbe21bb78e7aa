//! BDD step definitions for the derived view feature

use std::time::Duration;

use chrono::TimeDelta;
use cucumber::{then, when};

use antarctic_explorer::view::DerivedView;

use crate::world::ExplorerWorld;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

async fn build_view(world: &mut ExplorerWorld, offset: TimeDelta) {
    let handle = world.state.as_ref().expect("history not set");
    let snapshot = handle.read().await.snapshot();
    let last = snapshot
        .last()
        .map(|r| r.timestamp())
        .unwrap_or_else(ExplorerWorld::start_time);
    world.view = Some(DerivedView::build(&snapshot, last + offset, DAY));
}

fn view(world: &ExplorerWorld) -> &DerivedView {
    world.view.as_ref().expect("view not built")
}

#[when("the view is built")]
async fn view_built(world: &mut ExplorerWorld) {
    build_view(world, TimeDelta::zero()).await;
}

#[when(expr = "the view is built {int} hours later")]
async fn view_built_later(world: &mut ExplorerWorld, hours: i64) {
    build_view(world, TimeDelta::hours(hours)).await;
}

#[then(expr = "the trend slope should be {float}")]
fn trend_slope(world: &mut ExplorerWorld, expected: f64) {
    let trend = view(world).trend.expect("no trend");
    assert!(
        (trend.slope - expected).abs() < 1e-9,
        "Expected slope {}, got {}",
        expected,
        trend.slope
    );
}

#[then(expr = "the trend intercept should be {float}")]
fn trend_intercept(world: &mut ExplorerWorld, expected: f64) {
    let trend = view(world).trend.expect("no trend");
    assert!(
        (trend.intercept - expected).abs() < 1e-9,
        "Expected intercept {}, got {}",
        expected,
        trend.intercept
    );
}

#[then(expr = "the trend line should have {int} points")]
fn trend_points(world: &mut ExplorerWorld, expected: usize) {
    assert_eq!(view(world).trend_series().len(), expected);
}

#[then("there should be no trend line")]
fn no_trend(world: &mut ExplorerWorld) {
    let view = view(world);
    assert!(view.trend.is_none());
    assert!(view.trend_line.is_empty());
}

#[then(expr = "the current reading text should be {string}")]
fn current_reading_text(world: &mut ExplorerWorld, expected: String) {
    assert_eq!(view(world).current_reading_text(), expected);
}

#[then(expr = "the average text should be {string}")]
fn average_text(world: &mut ExplorerWorld, expected: String) {
    assert_eq!(view(world).windowed_average_text(), expected);
}
