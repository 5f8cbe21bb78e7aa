//! BDD test world for the antarctic explorer service

use antarctic_explorer::state::StateHandle;
use antarctic_explorer::view::DerivedView;
use antarctic_explorer::Config;
use chrono::{DateTime, TimeZone, Utc};
use cucumber::World;

#[derive(Debug, Default, World)]
pub struct ExplorerWorld {
    // History and view testing
    pub state: Option<StateHandle>,
    pub view: Option<DerivedView>,

    // Configuration testing
    pub config: Option<Config>,
    pub config_error: Option<String>,
}

impl ExplorerWorld {
    /// Time of the first recorded reading; later ones are three seconds apart
    pub fn start_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 1, 9, 0, 0).unwrap()
    }
}
