//! src/controller/event_loop.rs
//! ============================================================================
//! # EventLoop: Timers, Action Dispatch, and the Serialized Commit Path
//!
//! The controller owns the two interval timers (poll and auto-advance), the
//! action channel that background tasks report into, and the collaborator
//! handles. Slide commits funnel through `dispatch`, one at a time, so the
//! existence re-check and the sequence append always happen back to back.

use std::sync::Arc;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::sync::{Mutex, Notify};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::controller::actions::Action;
use crate::model::app_state::AppState;
use crate::model::slideshow_state::Slide;
use crate::remote::auth::AccessBroker;
use crate::remote::fetch::ImageFetcher;
use crate::remote::file_meta::FileMeta;
use crate::remote::listing::FileListing;
use crate::tasks::poll_task;
use crate::view::surface::{NoticeLevel, RenderSurface};

pub struct EventLoop {
    app: Arc<Mutex<AppState>>,
    action_rx: UnboundedReceiver<Action>,
    action_tx: UnboundedSender<Action>,
    broker: Arc<dyn AccessBroker>,
    listing: Arc<dyn FileListing>,
    fetcher: Arc<dyn ImageFetcher>,
    surface: Arc<dyn RenderSurface>,
}

impl EventLoop {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        app: Arc<Mutex<AppState>>,
        action_rx: UnboundedReceiver<Action>,
        action_tx: UnboundedSender<Action>,
        broker: Arc<dyn AccessBroker>,
        listing: Arc<dyn FileListing>,
        fetcher: Arc<dyn ImageFetcher>,
        surface: Arc<dyn RenderSurface>,
    ) -> Self {
        EventLoop {
            app,
            action_rx,
            action_tx,
            broker,
            listing,
            fetcher,
            surface,
        }
    }

    /// Drives the session until `shutdown` is signalled or the action
    /// channel closes. Timer ticks and task completions interleave here;
    /// nothing dispatched from this loop can kill it.
    pub async fn run(mut self, shutdown: Arc<Notify>) {
        let (poll_every, advance_every) = {
            let app = self.app.lock().await;
            (app.config.poll_interval, app.config.advance_interval)
        };

        // First tick lands one full interval after startup.
        let mut poll_timer: Interval = time::interval_at(Instant::now() + poll_every, poll_every);
        poll_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut advance_timer: Interval =
            time::interval_at(Instant::now() + advance_every, advance_every);
        advance_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            poll_secs = poll_every.as_secs(),
            advance_secs = advance_every.as_secs(),
            "event loop started"
        );

        loop {
            tokio::select! {
                _ = shutdown.notified() => {
                    info!("shutdown signal received");
                    break;
                }

                _ = poll_timer.tick() => self.dispatch(Action::PollTick).await,

                _ = advance_timer.tick() => self.dispatch(Action::AdvanceTick).await,

                maybe_action = self.action_rx.recv() => {
                    match maybe_action {
                        Some(Action::Quit) | None => {
                            info!("action stream ended");
                            break;
                        }
                        Some(action) => self.dispatch(action).await,
                    }
                }
            }
        }

        info!("event loop ended");
    }

    async fn dispatch(&mut self, action: Action) {
        match action {
            Action::PollTick | Action::FetchNow => {
                poll_task::spawn_poll_cycle(
                    self.app.clone(),
                    self.broker.clone(),
                    self.listing.clone(),
                    self.fetcher.clone(),
                    self.action_tx.clone(),
                );
            }

            Action::AdvanceTick => {
                let advanced: Option<usize> = {
                    let mut app = self.app.lock().await;
                    app.slideshow.auto_advance_tick()
                };
                if let Some(index) = advanced {
                    self.advance_to_slide(index).await;
                }
            }

            Action::Authorize { code } => {
                let broker = self.broker.clone();
                let action_tx = self.action_tx.clone();
                tokio::spawn(async move {
                    match broker.exchange_code(&code).await {
                        Ok(()) => {
                            let _ = action_tx.send(Action::Notice {
                                level: NoticeLevel::Success,
                                message: "authorization complete, tokens stored".to_string(),
                            });
                            // pull the folder right away instead of waiting a tick
                            let _ = action_tx.send(Action::FetchNow);
                        }
                        Err(err) => {
                            let _ = action_tx.send(Action::Notice {
                                level: NoticeLevel::Error,
                                message: format!("authorization failed: {err}"),
                            });
                        }
                    }
                });
            }

            Action::SlideLoaded {
                file,
                width,
                height,
            } => self.commit_slide(file, width, height).await,

            Action::SlideFailed {
                id,
                name,
                attempts,
                error,
            } => {
                warn!(%id, attempts, "giving up on {name}: {error}");
                self.surface.on_notice(
                    NoticeLevel::Warning,
                    &format!("could not load {name} after {attempts} attempts"),
                );
            }

            Action::Notice { level, message } => self.surface.on_notice(level, &message),

            // handled in `run` before dispatch
            Action::Quit => {}
        }
    }

    /// Commit half of a materialization: the idempotent, id-keyed insert,
    /// immediately before the sequence mutation. Stale retries and
    /// overlapping poll cycles land here as no-ops.
    async fn commit_slide(&self, file: FileMeta, width: u32, height: u32) {
        let committed: Option<Slide> = {
            let mut app = self.app.lock().await;
            app.commit_slide(file, width, height)
                .and_then(|position| app.slideshow.get(position).cloned())
        };

        match committed {
            Some(slide) => {
                self.surface.on_new_slide(&slide);
                // Jump to the newest slide. The auto-advance cursor runs
                // independently and is not reset by this.
                self.advance_to_slide(slide.position).await;
            }
            None => debug!("slide already present, commit skipped"),
        }
    }

    /// Brings `index` into view; no-op when the index is out of range.
    async fn advance_to_slide(&self, index: usize) {
        let in_range: bool = {
            let app = self.app.lock().await;
            app.slideshow.in_range(index)
        };
        if in_range {
            self.surface.on_advance(index);
        }
    }
}
