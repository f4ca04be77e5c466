//! Pointer-event scripts with logical timestamps.
//!
//! ```json
//! [
//!   { "at": 0,   "event": "enter", "country": 356 },
//!   { "at": 30,  "event": "move",  "country": "156" },
//!   { "at": 200, "event": "click", "country": 356 },
//!   { "at": 900, "event": "leave" },
//!   { "at": 950, "event": "dismiss" }
//! ]
//! ```

use foundation::ids::CountryId;
use foundation::time::Time;
use futures_util::future::join_all;
use scene::selection::FeatureRef;
use serde::Deserialize;
use streaming::orchestrator::LoadOutcome;
use thiserror::Error;
use tracing::info;

use crate::config::find_country;
use crate::controller::InteractionController;
use crate::render::GlobeRenderer;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScriptStep {
    /// Milliseconds since the start of the script.
    pub at: u64,
    #[serde(flatten)]
    pub event: ScriptEvent,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum ScriptEvent {
    Enter { country: CountryKey },
    Move { country: CountryKey },
    Leave,
    Click { country: CountryKey },
    Dismiss,
}

/// Ids may be written as numbers or strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CountryKey {
    Numeric(u32),
    Text(String),
}

impl From<CountryKey> for CountryId {
    fn from(key: CountryKey) -> Self {
        match key {
            CountryKey::Numeric(n) => CountryId::numeric(n),
            CountryKey::Text(s) => CountryId::code(s.trim()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("invalid event script")]
    Script(#[from] serde_json::Error),
    #[error("event at {at}ms refers to unknown country {id}")]
    UnknownCountry { at: u64, id: CountryId },
    #[error("event at {at}ms goes back in time")]
    OutOfOrder { at: u64 },
}

pub fn parse_script(text: &str) -> Result<Vec<ScriptStep>, ReplayError> {
    let steps: Vec<ScriptStep> = serde_json::from_str(text)?;
    let mut last = 0;
    for step in &steps {
        if step.at < last {
            return Err(ReplayError::OutOfOrder { at: step.at });
        }
        last = step.at;
    }
    Ok(steps)
}

#[derive(Debug, Default, PartialEq)]
pub struct ReplayReport {
    /// `(time, hovered country name)` for every committed hover change.
    pub hover_changes: Vec<(u64, Option<String>)>,
    pub outcomes: Vec<LoadOutcome>,
}

/// Feeds `steps` to the controller, then waits for every fetch it started.
///
/// Pending hovers commit at their due time before the next event is applied,
/// and once more after the last event.
pub async fn run<R: GlobeRenderer>(
    controller: &mut InteractionController<R>,
    features: &[FeatureRef],
    steps: Vec<ScriptStep>,
) -> Result<ReplayReport, ReplayError> {
    let mut report = ReplayReport::default();
    let mut loads = Vec::new();

    for step in steps {
        settle_hover(controller, Time::from_millis(step.at), &mut report);
        let now = Time::from_millis(step.at);
        let lookup = |key: CountryKey| {
            let id = CountryId::from(key);
            find_country(features, &id)
                .cloned()
                .ok_or(ReplayError::UnknownCountry { at: step.at, id })
        };
        match step.event {
            ScriptEvent::Enter { country } => controller.pointer_enter(lookup(country)?, now),
            ScriptEvent::Move { country } => controller.pointer_move(lookup(country)?, now),
            ScriptEvent::Leave => controller.pointer_leave(now),
            ScriptEvent::Click { country } => {
                if let Some(load) = controller.click(lookup(country)?) {
                    loads.push(load);
                }
            }
            ScriptEvent::Dismiss => {
                controller.dismiss();
            }
        }
    }
    if let Some(due) = controller.hover_due_at() {
        settle_hover(controller, due, &mut report);
    }

    report.outcomes = join_all(loads).await;
    info!(
        hover_changes = report.hover_changes.len(),
        loads = report.outcomes.len(),
        "replay finished"
    );
    Ok(report)
}

fn settle_hover<R: GlobeRenderer>(
    controller: &mut InteractionController<R>,
    now: Time,
    report: &mut ReplayReport,
) {
    while let Some(due) = controller.hover_due_at().filter(|due| *due <= now) {
        if controller.tick(due) {
            let name = controller
                .selection()
                .hovered
                .as_ref()
                .map(|f| f.name().to_string());
            report.hover_changes.push((due.as_millis(), name));
        }
    }
}
