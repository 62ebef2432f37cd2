//! src/tasks/poll_task.rs
//! ============================================================================
//! # Poll Task: One Listing-and-Materialize Cycle
//!
//! Runs one poll cycle: token, listing call (with a single refresh round on
//! 401), cursor update, delta against the ledger, then the per-file fan-out.
//! Every failure is reported on the action channel instead of propagating,
//! so the timers that trigger cycles stay alive no matter what happens here.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::controller::actions::Action;
use crate::model::app_state::AppState;
use crate::remote::auth::AccessBroker;
use crate::remote::auth::AccessToken;
use crate::remote::fetch::ImageFetcher;
use crate::remote::file_meta::FileMeta;
use crate::remote::listing::{FileListing, ListingError, ListingPage, PageQuery};
use crate::tasks::materialize_task::{MaterializeOutcome, spawn_materialize};
use crate::util::backoff::RetryPolicy;
use crate::view::surface::NoticeLevel;

/// Detaches one poll cycle. Called from the timer tick and from the manual
/// trigger; a slow or hung cycle never blocks the event loop.
pub fn spawn_poll_cycle(
    app: Arc<Mutex<AppState>>,
    broker: Arc<dyn AccessBroker>,
    listing: Arc<dyn FileListing>,
    fetcher: Arc<dyn ImageFetcher>,
    action_tx: UnboundedSender<Action>,
) {
    tokio::spawn(run_poll_cycle(app, broker, listing, fetcher, action_tx));
}

/// One listing-and-materialize cycle. Infallible by contract: every failure
/// is converted into a notice and ends the cycle early.
pub async fn run_poll_cycle(
    app: Arc<Mutex<AppState>>,
    broker: Arc<dyn AccessBroker>,
    listing: Arc<dyn FileListing>,
    fetcher: Arc<dyn ImageFetcher>,
    action_tx: UnboundedSender<Action>,
) {
    let token: AccessToken = match broker.valid_access_token().await {
        Ok(token) => token,
        Err(err) => {
            debug!("poll cycle gated on auth: {err}");
            notify(
                &action_tx,
                NoticeLevel::Warning,
                "authorization required, run `auth <code>` to connect".to_string(),
            );
            return;
        }
    };

    let (folder_id, retry, query) = {
        let app = app.lock().await;
        let over_threshold: bool = app.slideshow.len() > app.config.page_threshold;
        let query: PageQuery = PageQuery {
            want_next_token: over_threshold,
            page_token: if over_threshold {
                app.session.page_cursor().map(str::to_owned)
            } else {
                None
            },
        };
        (
            app.config.folder_id.clone(),
            RetryPolicy::from(&app.config.retry),
            query,
        )
    };
    let paged: bool = query.want_next_token;

    let page: ListingPage = match listing
        .list_image_files(&token, &folder_id, query.clone())
        .await
    {
        Ok(page) => page,
        Err(ListingError::Unauthorized) => {
            // One refresh round, then one retried call. A second 401 ends
            // the cycle instead of looping.
            let fresh: AccessToken = match broker.refresh_access_token().await {
                Ok(token) => token,
                Err(err) => {
                    warn!("token refresh failed: {err}");
                    notify(
                        &action_tx,
                        NoticeLevel::Warning,
                        "authorization required, token refresh failed".to_string(),
                    );
                    return;
                }
            };
            match listing.list_image_files(&fresh, &folder_id, query).await {
                Ok(page) => page,
                Err(ListingError::Unauthorized) => {
                    notify(
                        &action_tx,
                        NoticeLevel::Warning,
                        "authorization required, refreshed token was rejected".to_string(),
                    );
                    return;
                }
                Err(err) => {
                    notify(
                        &action_tx,
                        NoticeLevel::Error,
                        format!("file listing failed: {err}"),
                    );
                    return;
                }
            }
        }
        Err(err) => {
            notify(
                &action_tx,
                NoticeLevel::Error,
                format!("file listing failed: {err}"),
            );
            return;
        }
    };

    let newest: Vec<FileMeta> = {
        let mut app = app.lock().await;
        if paged {
            app.session.set_page_cursor(page.next_page_token.clone());
        }
        app.session.delta(&page.files)
    };

    if newest.is_empty() {
        debug!(listed = page.files.len(), "no new files this cycle");
        return;
    }

    info!(
        listed = page.files.len(),
        new = newest.len(),
        "materializing new files"
    );

    // Fire-and-forget fan-out: later files are not held back by earlier
    // ones, so slides land in completion order.
    let mut handles: Vec<JoinHandle<MaterializeOutcome>> = Vec::with_capacity(newest.len());
    for file in newest {
        handles.push(spawn_materialize(
            app.clone(),
            fetcher.clone(),
            retry.clone(),
            action_tx.clone(),
            file,
        ));
    }

    // Detached join for diagnostics only; the fan-out above is already done.
    tokio::spawn(async move {
        let outcomes = futures::future::join_all(handles).await;
        let loaded: usize = outcomes
            .iter()
            .filter(|o| matches!(o, Ok(MaterializeOutcome::Loaded)))
            .count();
        let failed: usize = outcomes
            .iter()
            .filter(|o| matches!(o, Ok(MaterializeOutcome::Failed)))
            .count();
        info!(loaded, failed, "materialization fan-out settled");
    });
}

fn notify(action_tx: &UnboundedSender<Action>, level: NoticeLevel, message: String) {
    let _ = action_tx.send(Action::Notice { level, message });
}

// ------------------------------------------------------------------------- //
// Tests
// ------------------------------------------------------------------------- //
