use std::sync::Arc;

use foundation::time::Time;
use runtime::debounce::Debouncer;
use tracing::{debug, info};

use crate::feature::CountryFeature;

/// Quiescence window for hover updates, in milliseconds.
pub const HOVER_DEBOUNCE_MS: u64 = 60;

pub type FeatureRef = Arc<CountryFeature>;

/// Two references denote the same country when they are the same feature or
/// carry the same id.
pub fn same_feature(a: &CountryFeature, b: &CountryFeature) -> bool {
    std::ptr::eq(a, b) || matches!((&a.id, &b.id), (Some(x), Some(y)) if x == y)
}

fn same_slot(a: Option<&FeatureRef>, b: Option<&FeatureRef>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => same_feature(a, b),
        _ => false,
    }
}

#[derive(Debug, Clone)]
pub enum SelectionEvent {
    /// A debounced hover update has settled.
    HoverCommitted(Option<FeatureRef>),
    Click(FeatureRef),
    Dismiss,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InteractionPhase {
    Idle,
    Hovering,
    Selected,
}

/// Hover and selection are independent: selecting does not clear hover.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    pub hovered: Option<FeatureRef>,
    pub selected: Option<FeatureRef>,
}

impl SelectionState {
    /// Pure transition function.
    pub fn apply(&self, event: SelectionEvent) -> SelectionState {
        match event {
            SelectionEvent::HoverCommitted(hovered) => SelectionState {
                hovered,
                selected: self.selected.clone(),
            },
            SelectionEvent::Click(feature) => SelectionState {
                hovered: self.hovered.clone(),
                selected: Some(feature),
            },
            SelectionEvent::Dismiss => SelectionState {
                hovered: self.hovered.clone(),
                selected: None,
            },
        }
    }

    pub fn phase(&self) -> InteractionPhase {
        if self.selected.is_some() {
            InteractionPhase::Selected
        } else if self.hovered.is_some() {
            InteractionPhase::Hovering
        } else {
            InteractionPhase::Idle
        }
    }

    pub fn is_hovered(&self, feature: &CountryFeature) -> bool {
        self.hovered.as_deref().is_some_and(|h| same_feature(h, feature))
    }

    pub fn is_selected(&self, feature: &CountryFeature) -> bool {
        self.selected.as_deref().is_some_and(|s| same_feature(s, feature))
    }
}

/// Emitted when the selected country changes; drives camera framing and
/// data fetches.
#[derive(Debug, Clone)]
pub struct SelectionChange {
    pub previous: Option<FeatureRef>,
    pub current: Option<FeatureRef>,
}

/// Owns the hover/selection state and debounces hover input.
///
/// Pointer events are stamped with caller-supplied logical time; `tick`
/// commits a pending hover once the pointer has been quiet for the window.
#[derive(Debug)]
pub struct SelectionStateMachine {
    state: SelectionState,
    hover: Debouncer<Option<FeatureRef>>,
}

impl Default for SelectionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionStateMachine {
    pub fn new() -> Self {
        Self::with_debounce_window(HOVER_DEBOUNCE_MS)
    }

    pub fn with_debounce_window(window_ms: u64) -> Self {
        Self {
            state: SelectionState::default(),
            hover: Debouncer::new(window_ms),
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn hover_pending(&self) -> bool {
        self.hover.is_pending()
    }

    /// When the pending hover (if any) will commit.
    pub fn hover_due_at(&self) -> Option<Time> {
        self.hover.due_at()
    }

    pub fn pointer_enter(&mut self, feature: FeatureRef, now: Time) {
        self.schedule_hover(Some(feature), now);
    }

    pub fn pointer_move(&mut self, feature: FeatureRef, now: Time) {
        self.schedule_hover(Some(feature), now);
    }

    pub fn pointer_leave(&mut self, now: Time) {
        self.schedule_hover(None, now);
    }

    fn schedule_hover(&mut self, hovered: Option<FeatureRef>, now: Time) {
        if self.hover.schedule(hovered, now).is_some() {
            debug!(at = now.as_millis(), "hover superseded");
        }
    }

    /// Commits the pending hover if its window has elapsed.
    ///
    /// Returns `true` when the hovered country actually changed.
    pub fn tick(&mut self, now: Time) -> bool {
        let Some(hovered) = self.hover.poll(now) else {
            return false;
        };
        let changed = !same_slot(self.state.hovered.as_ref(), hovered.as_ref());
        self.state = self.state.apply(SelectionEvent::HoverCommitted(hovered));
        if changed {
            debug!(
                at = now.as_millis(),
                hovered = ?self.state.hovered.as_ref().map(|f| f.name()),
                "hover committed"
            );
        }
        changed
    }

    /// Selects immediately, bypassing the hover debounce.
    ///
    /// Clicking the already selected country is not a change.
    pub fn click(&mut self, feature: FeatureRef) -> Option<SelectionChange> {
        if self.state.is_selected(&feature) {
            return None;
        }
        let previous = self.state.selected.clone();
        self.state = self.state.apply(SelectionEvent::Click(feature));
        info!(
            id = ?self.state.selected.as_ref().and_then(|f| f.id.as_ref()),
            name = self.state.selected.as_ref().map(|f| f.name()).unwrap_or(""),
            "country selected"
        );
        Some(SelectionChange {
            previous,
            current: self.state.selected.clone(),
        })
    }

    pub fn dismiss(&mut self) -> Option<SelectionChange> {
        let previous = self.state.selected.clone()?;
        self.state = self.state.apply(SelectionEvent::Dismiss);
        info!(id = ?previous.id, "selection dismissed");
        Some(SelectionChange {
            previous: Some(previous),
            current: None,
        })
    }
}
