use std::path::{Path, PathBuf};

/// Everything the engine and its maintenance tasks need, resolved once at
/// startup. The engine takes this at construction time; nothing reads the
/// environment after this point.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the journal file. Created if missing.
    pub data_dir: PathBuf,
    /// Journal file name inside `data_dir`.
    pub journal_file: String,
    /// Prometheus exporter port; None disables metrics.
    pub metrics_port: Option<u16>,
    /// Compact the journal once this many appends accumulate.
    pub compact_threshold: u64,
    /// Days of inventory the seeding tool creates.
    pub seed_days: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            journal_file: "nightstock.journal".into(),
            metrics_port: None,
            compact_threshold: 1000,
            seed_days: 120,
        }
    }
}

impl Config {
    /// Read `NIGHTSTOCK_*` environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            data_dir: std::env::var("NIGHTSTOCK_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            journal_file: std::env::var("NIGHTSTOCK_JOURNAL_FILE")
                .unwrap_or(defaults.journal_file),
            metrics_port: std::env::var("NIGHTSTOCK_METRICS_PORT")
                .ok()
                .and_then(|s| s.parse().ok()),
            compact_threshold: std::env::var("NIGHTSTOCK_COMPACT_THRESHOLD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.compact_threshold),
            seed_days: std::env::var("NIGHTSTOCK_SEED_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.seed_days),
        }
    }

    /// Config rooted at a specific directory. Tests and benches.
    pub fn at(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into(), ..Self::default() }
    }

    pub fn journal_path(&self) -> PathBuf {
        self.data_dir.join(&self.journal_file)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
