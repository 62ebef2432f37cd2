//! src/logging.rs
//! ============================================================================
//! # Logging: Tracing Setup
//!
//! Two layers share one compact event format: a daily rolling file under
//! `logs/` and a stderr stream for live debugging. Every event carries a
//! monotonically increasing sequence number so interleaved task output can
//! be put back in emission order when reading the files.

use std::{
    fs,
    path::Path,
    sync::OnceLock,
    sync::atomic::{AtomicUsize, Ordering},
};

use tracing::Metadata;
use tracing_appender::rolling::{RollingFileAppender, daily};
use tracing_subscriber::{
    EnvFilter,
    fmt::{
        self, FmtContext,
        format::{FormatEvent, FormatFields, Writer},
    },
    layer::SubscriberExt,
    prelude::*,
};

static SEQ: OnceLock<AtomicUsize> = OnceLock::new();

const DEFAULT_DIRECTIVE: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::from_default_env().add_directive(
        DEFAULT_DIRECTIVE
            .parse()
            .expect("default directive is valid"),
    )
}

pub struct Logger;

impl Logger {
    /// Call **once** near the start of `main`.
    pub fn init_tracing() {
        // create logs/ if missing
        let log_dir: &Path = Path::new("logs");
        fs::create_dir_all(log_dir).expect("cannot create logs dir");

        SEQ.get_or_init(|| AtomicUsize::new(1));

        // daily rolling file appender → logs/reel-YYYY-MM-DD.log
        let file: RollingFileAppender = daily("logs", "reel");

        let file_layer = fmt::layer()
            .event_format(SeqFormat)
            .with_writer(file)
            .with_ansi(false)
            .with_filter(env_filter());

        let stderr_layer = fmt::layer()
            .event_format(SeqFormat)
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_filter(env_filter());

        tracing_subscriber::registry()
            .with(file_layer)
            .with(stderr_layer)
            .init();
    }
}

/// Compact formatter: `SEQ LEVEL [target] message`
struct SeqFormat;

impl<S, N> FormatEvent<S, N> for SeqFormat
where
    S: tracing::Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut w: Writer<'_>,
        ev: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let seq: usize = SEQ
            .get()
            .expect("SEQ not initialised")
            .fetch_add(1, Ordering::Relaxed);

        let meta: &'static Metadata<'static> = ev.metadata();
        write!(w, "{seq:06} {:5} [{}] ", meta.level(), meta.target())?;

        // all key-value pairs for this event (usually just the message)
        ctx.field_format().format_fields(w.by_ref(), ev)?;
        writeln!(w)
    }
}
