use std::{
    env, fs, io,
    net::SocketAddr,
    path::{Path, PathBuf},
    str::FromStr,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing_appender::{
    non_blocking::{NonBlocking, WorkerGuard},
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{filter::Directive, fmt, layer::SubscriberExt, EnvFilter, Registry};

const DEFAULT_LOG_DIR: &str = "/var/log/fraudshield";

/// Process-level failures that end a service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("failed to bind port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("server stopped: {0}")]
    Serve(#[source] io::Error),
}

/// Keeps the file writer flushing; drop it only when the process exits.
pub struct TracingGuards {
    _file_guard: Option<WorkerGuard>,
}

/// Installs the global subscriber: stdout always, plus a daily rolling file
/// under `$LOG_DIR/<service_name>/` when that directory is writable.
///
/// Events on `pinned_targets` are kept at `info` whatever `RUST_LOG` says.
pub fn init_tracing(service_name: &str, pinned_targets: &[&str]) -> TracingGuards {
    let filter = build_filter(env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(), pinned_targets);
    let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| DEFAULT_LOG_DIR.to_string());
    let log_root = PathBuf::from(log_dir).join(service_name);
    let max_files = env_or("LOG_MAX_FILES", 14usize);
    let stdout_layer = fmt::layer().with_writer(io::stdout);

    let file_guard = match open_file_sink(&log_root, service_name, max_files) {
        Some((writer, guard)) => {
            let subscriber = Registry::default()
                .with(filter)
                .with(stdout_layer)
                .with(fmt::layer().with_ansi(false).with_writer(writer));
            let _ = tracing::subscriber::set_global_default(subscriber);
            Some(guard)
        }
        None => {
            let subscriber = Registry::default().with(filter).with(stdout_layer);
            let _ = tracing::subscriber::set_global_default(subscriber);
            None
        }
    };

    TracingGuards {
        _file_guard: file_guard,
    }
}

fn build_filter(raw: Option<&str>, pinned_targets: &[&str]) -> EnvFilter {
    let mut filter = raw
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    for target in pinned_targets {
        if let Ok(directive) = format!("{target}=info").parse::<Directive>() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}

/// Rolls daily and keeps at most `max_files` files; `0` keeps everything.
fn open_file_sink(
    root: &Path,
    service_name: &str,
    max_files: usize,
) -> Option<(NonBlocking, WorkerGuard)> {
    fs::create_dir_all(root).ok()?;
    let mut builder = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(service_name)
        .filename_suffix("log");
    if max_files > 0 {
        builder = builder.max_log_files(max_files);
    }
    let appender = builder.build(root).ok()?;
    Some(tracing_appender::non_blocking(appender))
}

/// Reads `key` from the environment, falling back to `default` when the
/// variable is unset or does not parse as `T`.
pub fn env_or<T: FromStr>(key: &str, default: T) -> T {
    parse_or(env::var(key).ok().as_deref(), default)
}

/// Parses an optional raw value, falling back to `default`.
pub fn parse_or<T: FromStr>(raw: Option<&str>, default: T) -> T {
    raw.and_then(|value| value.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// Binds on all interfaces so the service is reachable from inside a container.
pub async fn bind_listener(port: u16) -> Result<TcpListener, ServiceError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServiceError::Bind { port, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        io::Write,
        sync::{Arc, Mutex},
    };

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("buffer").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn filtered_output(raw: Option<&str>, pinned: &[&str]) -> String {
        let buffer = Buffer::default();
        let writer = buffer.clone();
        let subscriber = Registry::default().with(build_filter(raw, pinned)).with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(move || writer.clone()),
        );
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "alert", "pinned event");
            tracing::info!(target: "chatter", "routine event");
            tracing::warn!(target: "chatter", "warning event");
        });
        let bytes = buffer.0.lock().expect("buffer").clone();
        String::from_utf8(bytes).expect("utf8")
    }

    #[test]
    fn parse_or_falls_back() {
        assert_eq!(parse_or::<u16>(None, 3000), 3000);
        assert_eq!(parse_or::<u16>(Some(""), 3000), 3000);
        assert_eq!(parse_or::<u16>(Some("not-a-port"), 3000), 3000);
        assert_eq!(parse_or::<u16>(Some("70000"), 3000), 3000);
    }

    #[test]
    fn parse_or_reads_value() {
        assert_eq!(parse_or::<u16>(Some("8080"), 3000), 8080);
        assert_eq!(parse_or::<u64>(Some(" 7 "), 14), 7);
    }

    #[test]
    fn env_or_uses_default_for_missing_key() {
        let value = env_or("FRAUDSHIELD_COMMON_TEST_UNSET_KEY", 42u32);
        assert_eq!(value, 42);
    }

    #[test]
    fn pinned_targets_survive_quiet_filter() {
        let output = filtered_output(Some("warn"), &["alert"]);
        assert!(output.contains("pinned event"), "{output}");
        assert!(output.contains("warning event"), "{output}");
        assert!(!output.contains("routine event"), "{output}");
    }

    #[test]
    fn filter_defaults_to_info() {
        let output = filtered_output(None, &[]);
        assert!(output.contains("pinned event"), "{output}");
        assert!(output.contains("routine event"), "{output}");
    }

    #[test]
    fn opens_rolling_file_under_service_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("alert-service");
        let sink = open_file_sink(&root, "alert-service", 3);
        assert!(sink.is_some());
        assert!(root.is_dir());
    }

    #[tokio::test]
    async fn binds_requested_port() {
        let listener = bind_listener(0).await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        assert!(addr.ip().is_unspecified());
        assert_ne!(addr.port(), 0);
    }

    #[tokio::test]
    async fn reports_port_in_use() {
        let taken = bind_listener(0).await.expect("bind");
        let port = taken.local_addr().expect("local addr").port();
        match bind_listener(port).await {
            Err(ServiceError::Bind { port: failed, .. }) => assert_eq!(failed, port),
            Ok(_) => panic!("expected bind failure"),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
}
