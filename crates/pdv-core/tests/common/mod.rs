#![allow(dead_code)]

pub mod fake_pulp;

use pdv_core::bugs::{BugGate, BugId, BUG_HTTPS_DISTRIBUTION};
use pdv_core::config::{PdvConfig, TaskPollConfig};
use pdv_core::version::PulpVersion;

use fake_pulp::FakePulp;

/// Config pointing the service and the fixture origin at `server`.
pub fn config_for(server: &FakePulp) -> PdvConfig {
    let mut cfg = PdvConfig::default();
    cfg.pulp.base_url = server.base_url.clone();
    cfg.fixtures.file_feed_url = format!("{}/fixtures/file/", server.base_url);
    cfg.fixtures.file_url = format!("{}/fixtures/file/1.iso", server.base_url);
    cfg.tasks = Some(TaskPollConfig {
        poll_interval_secs: 0.0,
        max_polls: 5,
    });
    cfg
}

/// Every bug fixed except https serving, which the fake server cannot do.
pub fn http_only_gate() -> Box<dyn BugGate> {
    Box::new(|bug: BugId, _: &PulpVersion| bug != BUG_HTTPS_DISTRIBUTION)
}

/// Every bug fixed except the listed ones.
pub fn gate_open_bugs(open: &'static [BugId]) -> Box<dyn BugGate> {
    Box::new(move |bug: BugId, _: &PulpVersion| {
        bug != BUG_HTTPS_DISTRIBUTION && !open.contains(&bug)
    })
}
