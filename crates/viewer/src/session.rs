use std::time::Duration;

use slog::{info, Logger};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::{
    normalize_region_name, MapSurface, PageSurface, Region, SupersedePolicy, ViewController,
    ANNOTATION_DELAY,
};

/// Everything that can change view state. Handlers run one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// A region control was clicked.
    Focus(Region),
    /// A control bound by registry key; unknown keys are ignored.
    FocusKey(String),
    /// The overview control was clicked.
    ResetView,
    /// Pointer entered a boundary feature; `name` is its raw `ADM1_EN` value.
    BoundaryHover { name: String },
    BoundaryLeave,
    /// Scheduled by a focus; see [`ViewController::on_annotation_due`].
    DelayedAnnotation { region: Region, generation: u64 },
    Shutdown,
}

#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub policy: SupersedePolicy,
    pub annotation_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            policy: SupersedePolicy::default(),
            annotation_delay: ANNOTATION_DELAY,
        }
    }
}

/// Cloneable sender side of a [`MapSession`].
#[derive(Clone)]
pub struct SessionHandle {
    events: UnboundedSender<UiEvent>,
}

impl SessionHandle {
    /// Returns false once the session has gone away.
    pub fn send(&self, event: UiEvent) -> bool {
        self.events.send(event).is_ok()
    }
}

/// The one place view state is mutated. Map backends, page controls and
/// delayed annotations all feed events in through a [`SessionHandle`].
pub struct MapSession<M, P> {
    controller: ViewController<M, P>,
    events: UnboundedReceiver<UiEvent>,
    handle: SessionHandle,
    logger: Logger,
}

impl<M: MapSurface, P: PageSurface> MapSession<M, P> {
    pub fn new(map: M, page: P, config: SessionConfig, logger: Logger) -> Self {
        let (tx, rx) = unbounded_channel();
        let controller = ViewController::new(
            map,
            page,
            tx.clone(),
            config.policy,
            config.annotation_delay,
            logger.clone(),
        );

        Self {
            controller,
            events: rx,
            handle: SessionHandle { events: tx },
            logger,
        }
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    pub fn controller(&self) -> &ViewController<M, P> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut ViewController<M, P> {
        &mut self.controller
    }

    /// Run a single event to completion. `Shutdown` only cancels the pending
    /// annotation here; the loops stop on it. Ids that do not resolve to a
    /// region are dropped without a log record.
    pub fn dispatch(&mut self, event: UiEvent) {
        match event {
            UiEvent::Focus(region) => self.controller.focus_region(region),
            UiEvent::FocusKey(key) => {
                if let Some(region) = Region::from_key(&key) {
                    self.controller.focus_region(region);
                }
            }
            UiEvent::ResetView => self.controller.reset_view(),
            UiEvent::BoundaryHover { name } => {
                self.controller
                    .on_boundary_hover(&normalize_region_name(&name));
            }
            UiEvent::BoundaryLeave => self.controller.on_boundary_leave(),
            UiEvent::DelayedAnnotation { region, generation } => {
                self.controller.on_annotation_due(region, generation)
            }
            UiEvent::Shutdown => self.controller.cancel_pending(),
        }
    }

    /// Handle whatever is already queued without waiting. Returns how many
    /// events ran; stops early at `Shutdown`.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            handled += 1;
            let stop = event == UiEvent::Shutdown;
            self.dispatch(event);
            if stop {
                break;
            }
        }
        handled
    }

    /// Process events until [`UiEvent::Shutdown`].
    pub async fn run(&mut self) {
        info!(self.logger, "session running");
        while let Some(event) = self.events.recv().await {
            let stop = event == UiEvent::Shutdown;
            self.dispatch(event);
            if stop {
                break;
            }
        }
        info!(self.logger, "session stopped");
    }
}
