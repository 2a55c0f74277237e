use std::sync::Once;

use snafu::{ResultExt, Whatever};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging to stderr.
///
/// The filter comes from `RUST_LOG` when it is set, otherwise from
/// `default_log_level` (for example `info` or `kura_cache=debug`).
///
/// A panic hook that reports through tracing is installed as well, so a
/// panicking storage task still leaves a trace in the log.
pub fn init_logging(default_log_level: &str) -> Result<(), Whatever> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_log_level));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .whatever_context("failed to install the global tracing subscriber")?;
    tracing::debug!("logging started");

    replace_panic_hook_with_tracing_panic_hook().forget();

    Ok(())
}

static FMT_LOG: Once = Once::new();

/// Install a pretty stdout subscriber for tests. Safe to call from every test.
pub fn install_fmt_log() {
    FMT_LOG.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty().with_test_writer())
            .try_init();
    });
}

/// Replace the default rust panic hook with one that logs through tracing.
///
/// When the returned guard is dropped the std hook is restored, unless
/// [`TracingPanicHookGuard::forget`] was called.
#[must_use]
pub fn replace_panic_hook_with_tracing_panic_hook() -> TracingPanicHookGuard {
    std::panic::set_hook(Box::new(tracing_panic_hook));
    TracingPanicHookGuard { act: true }
}

pub struct TracingPanicHookGuard {
    act: bool,
}

impl TracingPanicHookGuard {
    /// Keep the tracing hook installed for the rest of the process.
    pub fn forget(&mut self) { self.act = false; }
}

impl Drop for TracingPanicHookGuard {
    fn drop(&mut self) {
        if self.act {
            let _ = std::panic::take_hook();
        }
    }
}

fn tracing_panic_hook(info: &std::panic::PanicInfo<'_>) {
    let msg = match info.payload().downcast_ref::<&'static str>() {
        Some(s) => *s,
        None => match info.payload().downcast_ref::<String>() {
            Some(s) => &s[..],
            None => "Box<dyn Any>",
        },
    };

    let thread = std::thread::current();
    let thread = thread.name().unwrap_or("<unnamed>");

    match info.location() {
        Some(location) => {
            let location = format!("{}:{}:{}", location.file(), location.line(), location.column());
            tracing::error!(%thread, %location, "panic: {msg}");
        }
        None => tracing::error!(%thread, "panic: {msg}"),
    }
}
