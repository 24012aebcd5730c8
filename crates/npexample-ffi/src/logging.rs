//! Tracing setup for the plugin library.
//!
//! A browser plugin has no terminal of its own, so events go to syslog by
//! default, with an optional stderr copy. Initialization happens once per
//! process from `NP_Initialize`; if the host (or another plugin) already
//! installed a global subscriber, ours is quietly skipped.

use std::ffi::{c_int, CString};
use std::fmt::Write as _;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::{LogConfig, DEFAULT_FILTER};

/// Maximum length of one syslog line.
const MAX_LOG_MESSAGE_LEN: usize = 2048;

/// Install the global subscriber described by `config`.
///
/// Returns `false` when a subscriber was already in place.
pub fn init(config: &LogConfig) -> bool {
    let filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|err| {
        eprintln!(
            "npexample: invalid log filter {:?} ({err}), using {DEFAULT_FILTER:?}",
            config.filter
        );
        EnvFilter::new(DEFAULT_FILTER)
    });

    let syslog = config.syslog.then(SyslogLayer::new);
    let stderr = config.stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(syslog)
        .with(stderr)
        .try_init()
        .is_ok()
}

// ─── Syslog layer ───────────────────────────────────────────────────────

/// Tag at the head of every syslog line.
const IDENT: &str = "npexample";

/// Forwards each event to `syslog(3)` on the `LOG_USER` facility.
///
/// The process-wide `openlog` state belongs to the browser and is left
/// alone; lines carry their own [`IDENT`] prefix instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyslogLayer;

impl SyslogLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for SyslogLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut line = SyslogLine::default();
        event.record(&mut line);

        let text = line.finish(metadata.target());
        let Ok(text) = CString::new(sanitize_log_message(&text)) else {
            return;
        };
        let priority = libc::LOG_USER | priority_for(metadata.level());
        // SAFETY: "%s" consumes exactly the one NUL-terminated argument.
        unsafe { libc::syslog(priority, c"%s".as_ptr(), text.as_ptr()) };
    }
}

/// Syslog severity for a tracing level.
pub fn priority_for(level: &Level) -> c_int {
    match *level {
        Level::ERROR => libc::LOG_ERR,
        Level::WARN => libc::LOG_WARNING,
        Level::INFO => libc::LOG_INFO,
        _ => libc::LOG_DEBUG,
    }
}

/// One syslog line under construction: the event message, then
/// `key=value` pairs in recording order.
#[derive(Debug, Default)]
struct SyslogLine {
    message: String,
    fields: String,
}

impl SyslogLine {
    fn push(&mut self, field: &Field, value: std::fmt::Arguments<'_>) {
        if field.name() == "message" {
            self.message.clear();
            let _ = self.message.write_fmt(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    /// `npexample: <target>: <message> k=v ...`
    fn finish(self, target: &str) -> String {
        format!("{IDENT}: {target}: {}{}", self.message, self.fields)
    }
}

impl Visit for SyslogLine {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.push(field, format_args!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, format_args!("{value}"));
    }
}

/// Strip control characters and cap the length of a syslog line.
fn sanitize_log_message(message: &str) -> String {
    let cleaned: String = message
        .chars()
        .map(|c| if c == '\n' || c == '\t' { ' ' } else { c })
        .filter(|c| !c.is_control())
        .take(MAX_LOG_MESSAGE_LEN)
        .collect();
    if message.chars().count() > MAX_LOG_MESSAGE_LEN {
        format!("{cleaned}… (truncated)")
    } else {
        cleaned
    }
}
