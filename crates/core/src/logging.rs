//! Centralized logging configuration for the emulator.
//!
//! Every component logs through [`log`] with a [`LogCategory`] and a
//! [`LogLevel`]. Levels are configured per category in the global
//! [`LogConfig`], with a global level as the fallback for categories that
//! have none of their own.
//!
//! # Architecture
//!
//! - **LogConfig**: Thread-safe global configuration using atomic operations
//! - **LogLevel**: Hierarchical log levels (Off < Error < Warn < Info < Debug < Trace)
//! - **LogCategory**: One category per chip or concern (CPU, Bus, TIA, RIOT, ...)
//! - **log()**: Common logging function for all output with async file I/O
//!
//! # Performance
//!
//! The TIA logs from inside its colour-clock loop, so logging must stay cheap:
//! - The message closure is only evaluated when the category is enabled
//! - Each category is rate limited (sliding one second window)
//! - File output is handed to a background thread over a channel
//!
//! # Usage
//!
//! ```rust
//! use emu_core::logging::{log, LogCategory, LogLevel};
//!
//! log(LogCategory::TIA, LogLevel::Debug, || {
//!     format!("TIA: RESP0 strobe at pixel {}", 42)
//! });
//! ```

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Sender};
use std::sync::{Mutex, MutexGuard, OnceLock};
use std::thread;
use std::time::{Duration, Instant};

/// Log level for controlling verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    /// Parse log level from string (case-insensitive)
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "off" | "0" => Some(LogLevel::Off),
            "error" | "err" | "1" => Some(LogLevel::Error),
            "warn" | "warning" | "2" => Some(LogLevel::Warn),
            "info" | "3" => Some(LogLevel::Info),
            "debug" | "4" => Some(LogLevel::Debug),
            "trace" | "5" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    fn from_u8(val: u8) -> Self {
        match val {
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            5 => LogLevel::Trace,
            _ => LogLevel::Off,
        }
    }
}

/// Log category for different emulator components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogCategory {
    /// CPU wiring and stepping
    CPU,
    /// Bus decoding (undecoded addresses, open bus reads)
    Bus,
    /// TIA register strobes and scanline generation
    TIA,
    /// RIOT register array
    RIOT,
    /// Cartridge loading
    Cartridge,
    /// Unimplemented features/stubs
    Stubs,
}

impl LogCategory {
    /// Every category, in index order
    pub const ALL: [LogCategory; CATEGORY_COUNT] = [
        LogCategory::CPU,
        LogCategory::Bus,
        LogCategory::TIA,
        LogCategory::RIOT,
        LogCategory::Cartridge,
        LogCategory::Stubs,
    ];

    fn index(self) -> usize {
        match self {
            LogCategory::CPU => 0,
            LogCategory::Bus => 1,
            LogCategory::TIA => 2,
            LogCategory::RIOT => 3,
            LogCategory::Cartridge => 4,
            LogCategory::Stubs => 5,
        }
    }
}

const CATEGORY_COUNT: usize = 6;

/// Default number of messages each category may emit per second
pub const DEFAULT_RATE_LIMIT: usize = 60;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic while logging must not take the logger down with it
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Per-category bookkeeping for the rate limiter
#[derive(Default)]
struct CategoryWindow {
    timestamps: VecDeque<Instant>,
    dropped: usize,
    last_drop_report: Option<Instant>,
}

/// Sliding-window rate limiter, one window per category
struct RateLimiter {
    max_logs_per_second: AtomicUsize,
    window_duration: Duration,
    windows: Mutex<[CategoryWindow; CATEGORY_COUNT]>,
}

impl RateLimiter {
    fn new(max_logs_per_second: usize) -> Self {
        Self {
            max_logs_per_second: AtomicUsize::new(max_logs_per_second),
            window_duration: Duration::from_secs(1),
            windows: Mutex::new(std::array::from_fn(|_| CategoryWindow::default())),
        }
    }

    fn set_max_logs_per_second(&self, max: usize) {
        self.max_logs_per_second.store(max, Ordering::Relaxed);
    }

    fn max_logs_per_second(&self) -> usize {
        self.max_logs_per_second.load(Ordering::Relaxed)
    }

    /// Check if a log should be allowed based on rate limits
    ///
    /// Returns (allowed, dropped_count) where dropped_count is Some(n) when a
    /// summary of dropped messages is due.
    fn should_allow(&self, category: LogCategory) -> (bool, Option<usize>) {
        let now = Instant::now();
        let mut windows = lock(&self.windows);
        let window = &mut windows[category.index()];

        while let Some(&front) = window.timestamps.front() {
            if now.duration_since(front) > self.window_duration {
                window.timestamps.pop_front();
            } else {
                break;
            }
        }

        if window.timestamps.len() < self.max_logs_per_second() {
            window.timestamps.push_back(now);

            if window.dropped > 0 {
                let dropped = std::mem::take(&mut window.dropped);
                window.last_drop_report = Some(now);
                return (true, Some(dropped));
            }

            return (true, None);
        }

        window.dropped += 1;

        let report_due = match window.last_drop_report {
            None => true,
            Some(last) => now.duration_since(last) >= self.window_duration,
        };

        if report_due {
            let dropped = std::mem::take(&mut window.dropped);
            window.last_drop_report = Some(now);
            (false, Some(dropped))
        } else {
            (false, None)
        }
    }
}

/// Global logging configuration
pub struct LogConfig {
    /// Global log level (applies to all categories unless overridden)
    global_level: AtomicU8,
    /// Category-specific levels, indexed like [`LogCategory::ALL`]
    category_levels: [AtomicU8; CATEGORY_COUNT],
    /// Channel for sending log messages to background thread
    log_sender: Mutex<Option<Sender<String>>>,
    file_logging_enabled: AtomicBool,
    rate_limiter: RateLimiter,
}

impl LogConfig {
    /// Create a new LogConfig with all logging disabled
    fn new() -> Self {
        Self {
            global_level: AtomicU8::new(LogLevel::Off as u8),
            category_levels: std::array::from_fn(|_| AtomicU8::new(LogLevel::Off as u8)),
            log_sender: Mutex::new(None),
            file_logging_enabled: AtomicBool::new(false),
            rate_limiter: RateLimiter::new(DEFAULT_RATE_LIMIT),
        }
    }

    /// Get the global singleton instance
    pub fn global() -> &'static Self {
        static INSTANCE: OnceLock<LogConfig> = OnceLock::new();
        INSTANCE.get_or_init(LogConfig::new)
    }

    /// Set the global log level (applies to all categories unless overridden)
    pub fn set_global_level(&self, level: LogLevel) {
        self.global_level.store(level as u8, Ordering::Relaxed);
    }

    /// Get the global log level
    pub fn get_global_level(&self) -> LogLevel {
        LogLevel::from_u8(self.global_level.load(Ordering::Relaxed))
    }

    /// Set log level for a specific category
    pub fn set_level(&self, category: LogCategory, level: LogLevel) {
        self.category_levels[category.index()].store(level as u8, Ordering::Relaxed);
    }

    /// Get log level for a specific category
    pub fn get_level(&self, category: LogCategory) -> LogLevel {
        LogLevel::from_u8(self.category_levels[category.index()].load(Ordering::Relaxed))
    }

    /// Check if a message should be logged for the given category and level
    ///
    /// A category with its own level uses it; a category set to Off falls
    /// back to the global level.
    pub fn should_log(&self, category: LogCategory, level: LogLevel) -> bool {
        if level == LogLevel::Off {
            return false;
        }

        match self.get_level(category) {
            LogLevel::Off => level <= self.get_global_level(),
            category_level => level <= category_level,
        }
    }

    /// Reset all logging to Off
    pub fn reset(&self) {
        self.set_global_level(LogLevel::Off);
        for category in LogCategory::ALL {
            self.set_level(category, LogLevel::Off);
        }
    }

    /// Set the maximum logs per second per category (rate limit)
    pub fn set_rate_limit(&self, max_logs_per_second: usize) {
        self.rate_limiter.set_max_logs_per_second(max_logs_per_second);
    }

    /// Get the current rate limit (maximum logs per second per category)
    pub fn get_rate_limit(&self) -> usize {
        self.rate_limiter.max_logs_per_second()
    }

    /// Send all further output to a file
    ///
    /// Writing happens on a background thread so a slow disk never stalls a
    /// scanline. Replaces any previously configured file.
    pub fn set_log_file(&self, path: PathBuf) -> std::io::Result<()> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let (sender, receiver) = channel::<String>();

        thread::Builder::new()
            .name("log-writer".to_string())
            .spawn(move || {
                let mut file = file;
                while let Ok(message) = receiver.recv() {
                    // Logging must never crash the emulator
                    let _ = writeln!(file, "{}", message);
                    let _ = file.flush();
                }
            })?;

        *lock(&self.log_sender) = Some(sender);
        self.file_logging_enabled.store(true, Ordering::Relaxed);

        Ok(())
    }

    /// Close the log file and go back to stderr
    pub fn clear_log_file(&self) {
        *lock(&self.log_sender) = None;
        self.file_logging_enabled.store(false, Ordering::Relaxed);
    }

    fn write_message(&self, message: String) {
        if self.file_logging_enabled.load(Ordering::Relaxed) {
            if let Some(sender) = lock(&self.log_sender).as_ref() {
                if let Err(unsent) = sender.send(message) {
                    eprintln!("{}", unsent.0);
                }
                return;
            }
        }

        eprintln!("{}", message);
    }
}

/// Log a message with the specified category and level
///
/// The message is built lazily by `message_fn`, so formatting only happens
/// when the category is enabled at `level` and the rate limit allows it.
/// When messages are dropped by the rate limiter a one-line summary is
/// emitted at most once per second per category.
///
/// # Examples
///
/// ```rust
/// use emu_core::logging::{log, LogCategory, LogLevel};
///
/// log(LogCategory::Bus, LogLevel::Trace, || {
///     format!("Bus: undecoded read at {:04X}", 0x0200)
/// });
/// ```
pub fn log<F>(category: LogCategory, level: LogLevel, message_fn: F)
where
    F: FnOnce() -> String,
{
    let config = LogConfig::global();
    if !config.should_log(category, level) {
        return;
    }

    let (allowed, dropped_count) = config.rate_limiter.should_allow(category);

    if let Some(count) = dropped_count.filter(|&count| count > 0) {
        config.write_message(format!(
            "[{:?}] WARNING: Rate limit exceeded, {} log message(s) dropped in the last second",
            category, count
        ));
    }

    if allowed {
        config.write_message(message_fn());
    }
}
