use std::time::Duration;

use slog::{debug, trace, Logger};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::{
    templates, MapSurface, PageSurface, Region, UiEvent, Viewport, OVERVIEW, OVERVIEW_LABEL,
};

/// Camera animation length for region focus and reset.
pub const FLY_DURATION: Duration = Duration::from_millis(1500);

/// Delay between starting a focus animation and opening the region's annotation.
/// A heuristic so the popup lands near the end of the flight; nothing waits on
/// the animation itself.
pub const ANNOTATION_DELAY: Duration = Duration::from_millis(1200);

/// What happens to a pending delayed annotation when a newer focus (or a reset)
/// comes in before it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SupersedePolicy {
    /// Every scheduled annotation fires; whichever fires last owns the slot.
    #[default]
    LastWriteWins,
    /// Only the most recent focus may open its annotation.
    CancelPending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnnotationSlot {
    #[default]
    Closed,
    Open(Region),
}

struct PendingAnnotation {
    generation: u64,
    cancel: CancellationToken,
}

/// Owns the annotation slot, the viewport target and the control highlight.
///
/// Must be driven from a single logical thread (see [`crate::MapSession`]);
/// [`ViewController::focus_region`] needs a Tokio runtime to schedule its
/// delayed annotation.
pub struct ViewController<M, P> {
    map: M,
    page: P,
    logger: Logger,
    events: UnboundedSender<UiEvent>,
    policy: SupersedePolicy,
    annotation_delay: Duration,
    slot: AnnotationSlot,
    viewport: Viewport,
    current_view: String,
    selected: Option<Region>,
    generation: u64,
    pending: Option<PendingAnnotation>,
}

impl<M: MapSurface, P: PageSurface> ViewController<M, P> {
    pub fn new(
        map: M,
        page: P,
        events: UnboundedSender<UiEvent>,
        policy: SupersedePolicy,
        annotation_delay: Duration,
        logger: Logger,
    ) -> Self {
        Self {
            map,
            page,
            logger,
            events,
            policy,
            annotation_delay,
            slot: AnnotationSlot::Closed,
            viewport: OVERVIEW,
            current_view: OVERVIEW_LABEL.to_string(),
            selected: None,
            generation: 0,
            pending: None,
        }
    }

    /// Open the annotation for `id`, closing whatever is open first.
    /// Unknown ids are ignored.
    pub fn show_annotation(&mut self, id: &str) {
        if let Some(region) = Region::from_key(id) {
            self.open_annotation(region);
        }
    }

    fn open_annotation(&mut self, region: Region) {
        self.close_active_annotation();
        self.map
            .open_popup(region.center(), templates::annotation(region));
        self.slot = AnnotationSlot::Open(region);
        debug!(self.logger, "annotation opened"; "region" => region.key());
    }

    pub fn close_active_annotation(&mut self) {
        if let AnnotationSlot::Open(region) = std::mem::take(&mut self.slot) {
            self.map.close_popup();
            debug!(self.logger, "annotation closed"; "region" => region.key());
        }
    }

    /// Fly to `region`, then open its annotation after the annotation delay.
    pub fn focus_region(&mut self, region: Region) {
        let target = region.viewport();
        self.map.fly_to(target, FLY_DURATION);
        self.viewport = target;
        self.schedule_annotation(region);
        self.set_current_view(region.name());
        self.highlight(Some(region));
        debug!(self.logger, "focusing region"; "region" => region.key(), "generation" => self.generation);
    }

    pub fn reset_view(&mut self) {
        if self.policy == SupersedePolicy::CancelPending {
            self.cancel_pending();
            self.generation += 1;
        }
        self.map.fly_to(OVERVIEW, FLY_DURATION);
        self.viewport = OVERVIEW;
        self.close_active_annotation();
        self.set_current_view(OVERVIEW_LABEL);
        self.highlight(None);
        debug!(self.logger, "view reset to overview");
    }

    pub fn on_boundary_hover(&mut self, normalized_name: &str) {
        self.show_annotation(normalized_name);
    }

    pub fn on_boundary_leave(&mut self) {
        self.close_active_annotation();
    }

    /// A delayed annotation scheduled by [`ViewController::focus_region`] came due.
    pub fn on_annotation_due(&mut self, region: Region, generation: u64) {
        if self.policy == SupersedePolicy::CancelPending && generation != self.generation {
            trace!(self.logger, "dropping superseded annotation"; "region" => region.key(), "generation" => generation);
            return;
        }
        if self
            .pending
            .as_ref()
            .is_some_and(|p| p.generation == generation)
        {
            self.pending = None;
        }
        self.show_annotation(region.key());
    }

    /// Cancel the most recently scheduled annotation, if it has not fired.
    pub fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.cancel.cancel();
            trace!(self.logger, "pending annotation cancelled"; "generation" => pending.generation);
        }
    }

    fn schedule_annotation(&mut self, region: Region) {
        if self.policy == SupersedePolicy::CancelPending {
            self.cancel_pending();
        }
        self.generation += 1;
        let generation = self.generation;
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let events = self.events.clone();
        let delay = self.annotation_delay;

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    // The session may have shut down in the meantime.
                    let _ = events.send(UiEvent::DelayedAnnotation { region, generation });
                }
            }
        });

        self.pending = Some(PendingAnnotation { generation, cancel });
    }

    fn set_current_view(&mut self, label: &str) {
        self.current_view = label.to_string();
        self.page.set_current_view(label);
    }

    /// At most one control is active.
    fn highlight(&mut self, selected: Option<Region>) {
        for region in Region::ALL {
            self.page
                .set_control_active(region, Some(region) == selected);
        }
        self.selected = selected;
    }

    pub fn annotation(&self) -> AnnotationSlot {
        self.slot
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn current_view_label(&self) -> &str {
        &self.current_view
    }

    pub fn selected(&self) -> Option<Region> {
        self.selected
    }

    pub fn policy(&self) -> SupersedePolicy {
        self.policy
    }

    pub fn has_pending_annotation(&self) -> bool {
        self.pending.is_some()
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }
}
