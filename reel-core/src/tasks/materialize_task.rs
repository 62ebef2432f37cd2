//! src/tasks/materialize_task.rs
//! ============================================================================
//! # Materialize Task: Bounded-Retry Image Load
//!
//! The load half of turning a file descriptor into a slide. Each file gets
//! its own spawned task: existence check, hi-res URL, then the fetch wrapped
//! by the retry engine. Success hands a `SlideLoaded` action to the event
//! loop, which performs the serialized commit (second existence check plus
//! sequence append). Failure after the retry budget is reported per file and
//! never touches sibling loads.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::controller::actions::Action;
use crate::error::AppError;
use crate::model::app_state::AppState;
use crate::remote::fetch::ImageFetcher;
use crate::remote::file_meta::FileMeta;
use crate::util::backoff::{self, RetryPolicy};

/// Terminal state of one materialization, collected for per-cycle
/// diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterializeOutcome {
    /// Image loaded; commit handed to the event loop.
    Loaded,
    /// Another attempt already materialized this id.
    Skipped,
    /// Retry budget exhausted.
    Failed,
}

/// Spawns the load task for one file. Fire-and-forget on the hot path; the
/// handle is only joined by the poll cycle's detached diagnostics task.
pub fn spawn_materialize(
    app: Arc<Mutex<AppState>>,
    fetcher: Arc<dyn ImageFetcher>,
    retry: RetryPolicy,
    action_tx: UnboundedSender<Action>,
    file: FileMeta,
) -> JoinHandle<MaterializeOutcome> {
    tokio::spawn(async move {
        // First existence check. The commit path re-checks right before the
        // sequence mutation, which closes the gap left open by the
        // suspension points below.
        let hi_res_suffix: String = {
            let app = app.lock().await;
            if app.session.has_seen(&file.id) || app.slideshow.contains(&file.id) {
                debug!(id = %file.id, name = %file.name, "already materialized, skipping load");
                return MaterializeOutcome::Skipped;
            }
            app.config.hi_res_suffix.clone()
        };

        let url: String = file.hi_res_link(&hi_res_suffix);
        let fetcher_ref: &dyn ImageFetcher = fetcher.as_ref();

        match backoff::attempt(&retry, || fetcher_ref.fetch_image(&url)).await {
            Ok((width, height)) => {
                let _ = action_tx.send(Action::SlideLoaded {
                    file,
                    width,
                    height,
                });
                MaterializeOutcome::Loaded
            }
            Err(exhausted) => {
                let failure: AppError = AppError::ImageLoad {
                    id: file.id.clone(),
                    attempts: exhausted.attempts,
                    source: exhausted.source,
                };
                warn!(name = %file.name, "{failure}");
                let _ = action_tx.send(Action::SlideFailed {
                    id: file.id,
                    name: file.name,
                    attempts: exhausted.attempts,
                    error: failure.to_string(),
                });
                MaterializeOutcome::Failed
            }
        }
    })
}

// ------------------------------------------------------------------------- //
// Tests
// ------------------------------------------------------------------------- //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::remote::fetch::FetchError;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn meta(id: &str) -> FileMeta {
        FileMeta {
            id: id.to_string(),
            name: format!("{id}.jpg"),
            thumbnail_link: format!("https://lh3.example.com/{id}=s220"),
            created_time: Utc.timestamp_opt(0, 0).unwrap(),
        }
    }

    fn instant_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::ZERO,
            cap_delay: Duration::ZERO,
            jitter_max: Duration::ZERO,
        }
    }

    fn shared_state() -> Arc<Mutex<AppState>> {
        Arc::new(Mutex::new(AppState::new(Arc::new(Config::default()))))
    }

    struct OkFetcher {
        calls: AtomicU32,
    }

    #[async_trait]
    impl ImageFetcher for OkFetcher {
        async fn fetch_image(&self, _url: &str) -> Result<(u32, u32), FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((800, 600))
        }
    }

    struct BrokenFetcher {
        calls: AtomicU32,
    }

    #[async_trait]
    impl ImageFetcher for BrokenFetcher {
        async fn fetch_image(&self, _url: &str) -> Result<(u32, u32), FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(FetchError::Endpoint(reqwest::StatusCode::BAD_GATEWAY))
        }
    }

    #[tokio::test]
    async fn concurrent_loads_for_one_id_commit_a_single_slide() {
        let app = shared_state();
        let fetcher = Arc::new(OkFetcher {
            calls: AtomicU32::new(0),
        });
        let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

        // Two overlapping attempts for the same file, as an overlapping poll
        // cycle would produce.
        let first = spawn_materialize(
            app.clone(),
            fetcher.clone(),
            instant_policy(),
            action_tx.clone(),
            meta("A"),
        );
        let second = spawn_materialize(
            app.clone(),
            fetcher.clone(),
            instant_policy(),
            action_tx.clone(),
            meta("A"),
        );
        let outcomes = (first.await.unwrap(), second.await.unwrap());
        assert_ne!(outcomes.0, MaterializeOutcome::Failed);
        assert_ne!(outcomes.1, MaterializeOutcome::Failed);

        // Drain whatever both tasks produced into the commit path.
        drop(action_tx);
        while let Some(action) = action_rx.recv().await {
            if let Action::SlideLoaded {
                file,
                width,
                height,
            } = action
            {
                let mut app = app.lock().await;
                app.commit_slide(file, width, height);
            }
        }

        let app = app.lock().await;
        assert_eq!(app.slideshow.len(), 1);
        assert!(app.session.has_seen("A"));
    }

    #[tokio::test]
    async fn load_skips_when_the_ledger_already_has_the_id() {
        let app = shared_state();
        {
            let mut app = app.lock().await;
            app.commit_slide(meta("A"), 640, 480);
        }
        let fetcher = Arc::new(OkFetcher {
            calls: AtomicU32::new(0),
        });
        let (action_tx, _action_rx) = mpsc::unbounded_channel::<Action>();

        let outcome = spawn_materialize(app, fetcher.clone(), instant_policy(), action_tx, meta("A"))
            .await
            .unwrap();

        assert_eq!(outcome, MaterializeOutcome::Skipped);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn exhausted_retries_surface_as_a_per_file_failure() {
        let app = shared_state();
        let fetcher = Arc::new(BrokenFetcher {
            calls: AtomicU32::new(0),
        });
        let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

        let outcome = spawn_materialize(
            app.clone(),
            fetcher.clone(),
            instant_policy(),
            action_tx,
            meta("A"),
        )
        .await
        .unwrap();

        assert_eq!(outcome, MaterializeOutcome::Failed);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 5);

        match action_rx.recv().await {
            Some(Action::SlideFailed { id, attempts, .. }) => {
                assert_eq!(id, "A");
                assert_eq!(attempts, 5);
            }
            other => panic!("expected SlideFailed, got {other:?}"),
        }

        // nothing committed, nothing recorded
        let app = app.lock().await;
        assert!(app.slideshow.is_empty());
        assert!(!app.session.has_seen("A"));
    }
}
