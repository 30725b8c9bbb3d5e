//! Share control lifecycle on the host page.
//!
//! The controller watches the page's mutation feed. Whenever the toolbar
//! anchor is present and no share control exists, it inserts one right after
//! the anchor. When the toolbar goes away (single-page navigation) it falls
//! back to [`ControllerState::Unarmed`] and re-arms once the anchor returns.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chatshare_core::{HostSelectors, Result};
use chatshare_dom::{DomReader, DomWriter, ElementSpec, Mutation, NodeId};
use parking_lot::{Mutex, RwLock};
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::pipeline::{SharePipeline, ShareReport};

pub const CONTROL_LABEL: &str = "Share conversation";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// No toolbar seen yet, or it went away.
    Unarmed,
    /// Control injected and wired.
    Armed { control: NodeId },
}

/// The element inserted into the host toolbar.
pub fn control_spec(selectors: &HostSelectors) -> ElementSpec {
    ElementSpec::new("button")
        .class(selectors.control_class.clone())
        .attr("type", "button")
        .attr("aria-label", CONTROL_LABEL)
}

pub struct UiController<D> {
    dom: Arc<RwLock<D>>,
    selectors: HostSelectors,
    pipeline: Arc<SharePipeline>,
    page_url: RwLock<String>,
    state: Mutex<ControllerState>,
    mutations_seen: AtomicUsize,
}

impl<D> UiController<D>
where
    D: DomReader + DomWriter + Send + Sync + 'static,
{
    pub fn new(
        dom: Arc<RwLock<D>>,
        selectors: HostSelectors,
        pipeline: Arc<SharePipeline>,
        page_url: impl Into<String>,
    ) -> Self {
        Self {
            dom,
            selectors,
            pipeline,
            page_url: RwLock::new(page_url.into()),
            state: Mutex::new(ControllerState::Unarmed),
            mutations_seen: AtomicUsize::new(0),
        }
    }

    pub fn state(&self) -> ControllerState {
        *self.state.lock()
    }

    pub fn pipeline(&self) -> &Arc<SharePipeline> {
        &self.pipeline
    }

    /// Mutations handled by the background watch so far.
    pub fn mutations_seen(&self) -> usize {
        self.mutations_seen.load(Ordering::Acquire)
    }

    /// The host navigated to another conversation.
    pub fn set_page_url(&self, url: impl Into<String>) {
        *self.page_url.write() = url.into();
    }

    pub fn page_url(&self) -> String {
        self.page_url.read().clone()
    }

    /// Make sure exactly one control sits next to the toolbar anchor.
    /// Returns `true` when a control was inserted by this call.
    pub fn ensure_control(&self) -> Result<bool> {
        let anchor = {
            let dom = self.dom.read();
            if let Some(control) = dom.query_class(&self.selectors.control_class) {
                *self.state.lock() = ControllerState::Armed { control };
                return Ok(false);
            }
            self.find_anchor(&*dom)
        };

        let Some(anchor) = anchor else {
            let mut state = self.state.lock();
            if *state != ControllerState::Unarmed {
                debug!("Toolbar gone, share control disarmed");
            }
            *state = ControllerState::Unarmed;
            return Ok(false);
        };

        let mut dom = self.dom.write();
        // Someone may have inserted it between the two locks.
        if let Some(control) = dom.query_class(&self.selectors.control_class) {
            *self.state.lock() = ControllerState::Armed { control };
            return Ok(false);
        }
        let control = dom.insert_after(anchor, control_spec(&self.selectors))?;
        *self.state.lock() = ControllerState::Armed { control };
        info!("Share control injected");
        Ok(true)
    }

    fn find_anchor(&self, dom: &D) -> Option<NodeId> {
        dom.query_attribute(
            &self.selectors.anchor_tag,
            &self.selectors.anchor_attr,
            &self.selectors.anchor_value,
        )
    }

    /// Route a click on `target`. A click on the control runs the share
    /// pipeline; any other click dismisses the visible notification.
    pub async fn handle_click(&self, target: NodeId) -> Result<Option<ShareReport>> {
        let on_control = match self.state() {
            ControllerState::Armed { control } => self.dom.read().contains(control, target),
            ControllerState::Unarmed => false,
        };

        if !on_control {
            self.pipeline.notifications().click_outside();
            return Ok(None);
        }

        let page_url = self.page_url();
        self.pipeline.run(&*self.dom, &page_url).await.map(Some)
    }

    /// Start watching `feed`. The control is ensured once immediately and
    /// then after every mutation until [`WatchHandle::stop`] is called or
    /// the feed closes.
    pub fn start(self: &Arc<Self>, mut feed: broadcast::Receiver<Mutation>) -> WatchHandle {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let controller = Arc::clone(self);

        let task = tokio::spawn(async move {
            if let Err(e) = controller.ensure_control() {
                warn!("Initial control check failed: {}", e);
            }
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    received = feed.recv() => {
                        match received {
                            Ok(_) => {}
                            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                                debug!("Mutation feed lagged by {}", skipped);
                            }
                            Err(broadcast::error::RecvError::Closed) => break,
                        }
                        if let Err(e) = controller.ensure_control() {
                            warn!("Control check failed: {}", e);
                        }
                        controller.mutations_seen.fetch_add(1, Ordering::AcqRel);
                    }
                }
            }
            debug!("Mutation watch stopped");
        });

        WatchHandle {
            stop: Some(stop_tx),
            task,
        }
    }
}

/// Handle to a running mutation watch.
pub struct WatchHandle {
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl WatchHandle {
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the watch and wait for it to exit.
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        let _ = (&mut self.task).await;
    }
}
