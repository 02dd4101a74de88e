use crate::config::{LoggingConfig, Section};
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    io::{IsTerminal, Write},
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter::Targets, fmt};

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};

const DEFAULT_SECTION: &str = "default";

// -------- level helpers --------
fn parse_level_filter(s: &str) -> LevelFilter {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" | "none" | "" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

/// Returns true if target == crate_name or target starts with "crate_name::"
fn matches_crate_prefix(target: &str, crate_name: &str) -> bool {
    target == crate_name
        || (target.starts_with(crate_name) && target[crate_name.len()..].starts_with("::"))
}

// -------- rotating writer for files --------
#[derive(Clone)]
struct RotWriter(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl Write for RotWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.lock().flush()
    }
}

/// Writer that drops records routed nowhere.
struct RoutedWriter(Option<RotWriter>);

impl Write for RoutedWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.0 {
            Some(w) => w.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.0 {
            Some(w) => w.flush(),
            None => Ok(()),
        }
    }
}

/// Routes records to per-subsystem files by target prefix, falling back to
/// the default file.
#[derive(Default)]
struct FileRouter {
    default: Option<RotWriter>,
    by_prefix: HashMap<String, RotWriter>,
}

impl FileRouter {
    fn resolve_for(&self, target: &str) -> Option<RotWriter> {
        self.by_prefix
            .iter()
            .filter(|(prefix, _)| matches_crate_prefix(target, prefix))
            // longest prefix wins so "accounts::infra" beats "accounts"
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, w)| w.clone())
            .or_else(|| self.default.clone())
    }

    fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_prefix.is_empty()
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRouter {
    type Writer = RoutedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        RoutedWriter(self.default.clone())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        RoutedWriter(self.resolve_for(meta.target()))
    }
}

// -------- path resolution helpers --------

/// Resolve a log file path against `base_dir`.
/// Absolute paths are kept as-is; relative paths are joined with `base_dir`.
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

/// Create a rotating writer, ensuring the parent directory exists.
fn create_rotating_writer(section: &Section, base_dir: &Path) -> std::io::Result<RotWriter> {
    let log_path = resolve_log_path(&section.file, base_dir);
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let max_bytes = section.max_size_mb.unwrap_or(100) * 1024 * 1024;
    let rot = FileRotate::new(
        log_path,
        AppendTimestamp::default(FileLimit::MaxFiles(section.max_backups.unwrap_or(3))),
        ContentLimit::BytesSurpassed(max_bytes as usize),
        Compression::None,
        #[cfg(unix)]
        None, // file permissions (Unix only)
    );

    Ok(RotWriter(Arc::new(Mutex::new(rot))))
}

fn build_file_router(cfg: &LoggingConfig, base_dir: &Path) -> FileRouter {
    let mut router = FileRouter::default();

    for (name, section) in cfg {
        if section.file.trim().is_empty() {
            continue;
        }
        match create_rotating_writer(section, base_dir) {
            Ok(writer) if name == DEFAULT_SECTION => router.default = Some(writer),
            Ok(writer) => {
                router.by_prefix.insert(name.clone(), writer);
            }
            Err(e) => eprintln!(
                "Failed to init log file for '{}': {} ({})",
                name,
                resolve_log_path(&section.file, base_dir).display(),
                e
            ),
        }
    }

    router
}

/// Build a target filter from the sections; `level_of` picks the console or
/// file level. The "default" section sets the level for unlisted targets.
fn build_targets(cfg: &LoggingConfig, level_of: impl Fn(&Section) -> LevelFilter) -> Targets {
    let default_level = cfg.get(DEFAULT_SECTION).map(&level_of).unwrap_or(LevelFilter::OFF);

    cfg.iter()
        .filter(|(name, _)| name.as_str() != DEFAULT_SECTION)
        .fold(Targets::new().with_default(default_level), |targets, (name, section)| {
            targets.with_target(name.clone(), level_of(section))
        })
}

fn file_level(section: &Section) -> LevelFilter {
    if section.file.trim().is_empty() {
        LevelFilter::OFF
    } else {
        parse_level_filter(&section.file_level)
    }
}

// -------- public init --------

/// Initialize logging from a configuration.
/// - `cfg`: LoggingConfig containing the logging sections
/// - `base_dir`: base directory used to resolve relative log file paths
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    use tracing_subscriber::{prelude::*, Registry};

    // Bridge `log` → `tracing` *before* installing the subscriber
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        init_default_logging();
        return;
    }

    let console_layer = fmt::layer()
        .with_ansi(std::io::stdout().is_terminal())
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(build_targets(cfg, |s| parse_level_filter(&s.console_level)));

    let router = build_file_router(cfg, base_dir);
    if router.is_empty() {
        let _ = Registry::default().with(console_layer).try_init();
        return;
    }

    let file_layer = fmt::layer()
        .json()
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_writer(router)
        .with_filter(build_targets(cfg, file_level));

    let _ = Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

fn init_default_logging() {
    let _ = fmt()
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .try_init();
}

// =================== tests ===================
