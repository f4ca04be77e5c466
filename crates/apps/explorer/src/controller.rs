use foundation::time::Time;
use scene::framing::{FramingPolicy, TRANSITION_MS};
use scene::selection::{FeatureRef, SelectionState, SelectionStateMachine};
use scene::style::{PolygonStyle, auto_rotate};
use streaming::orchestrator::{CountryDataset, DataOrchestrator, LoadOutcome};
use streaming::source::BoxFuture;
use tracing::debug;

use crate::render::GlobeRenderer;

/// Routes pointer input through selection, camera framing and data loading.
///
/// Input handlers never block: a click returns the fetch cycle as a future for
/// the caller to drive, and the dataset can be snapshotted at any time.
pub struct InteractionController<R> {
    selection: SelectionStateMachine,
    framing: FramingPolicy,
    data: DataOrchestrator,
    style: PolygonStyle,
    renderer: R,
}

impl<R: GlobeRenderer> InteractionController<R> {
    pub fn new(
        framing: FramingPolicy,
        data: DataOrchestrator,
        style: PolygonStyle,
        mut renderer: R,
    ) -> Self {
        let selection = SelectionStateMachine::new();
        renderer.set_auto_rotate(auto_rotate(selection.state()));
        Self {
            selection,
            framing,
            data,
            style,
            renderer,
        }
    }

    pub fn selection(&self) -> &SelectionState {
        self.selection.state()
    }

    pub fn style(&self) -> PolygonStyle {
        self.style
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn dataset(&self) -> CountryDataset {
        self.data.snapshot()
    }

    pub fn hover_due_at(&self) -> Option<Time> {
        self.selection.hover_due_at()
    }

    pub fn pointer_enter(&mut self, feature: FeatureRef, now: Time) {
        self.selection.pointer_enter(feature, now);
    }

    pub fn pointer_move(&mut self, feature: FeatureRef, now: Time) {
        self.selection.pointer_move(feature, now);
    }

    pub fn pointer_leave(&mut self, now: Time) {
        self.selection.pointer_leave(now);
    }

    /// Advances logical time; `true` when the hovered country changed.
    pub fn tick(&mut self, now: Time) -> bool {
        self.selection.tick(now)
    }

    /// Selects `feature`, flies the camera to it and starts loading its data.
    ///
    /// Returns `None` when nothing needs fetching: the country was already
    /// selected, or it has no id to query the backend with.
    pub fn click(&mut self, feature: FeatureRef) -> Option<BoxFuture<'static, LoadOutcome>> {
        self.selection.click(feature.clone())?;

        let pose = self.framing.frame_feature(&feature);
        self.renderer.point_of_view(pose, TRANSITION_MS);
        self.renderer.set_auto_rotate(auto_rotate(self.selection.state()));

        match &feature.id {
            Some(id) => Some(self.data.load_country(id.clone())),
            None => {
                debug!(name = feature.name(), "selected country has no id, not fetching");
                self.data.reset();
                None
            }
        }
    }

    /// Closes the panel. Returns `false` if nothing was selected.
    pub fn dismiss(&mut self) -> bool {
        if self.selection.dismiss().is_none() {
            return false;
        }
        self.data.reset();
        self.renderer.set_auto_rotate(auto_rotate(self.selection.state()));
        true
    }
}
