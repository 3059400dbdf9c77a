//! Configuration constants and default values.
//!
//! This module contains the widget geometry, timing constants,
//! NSUserDefaults keys and opener limits.

use std::time::Duration;

// === Window Geometry ===

/// Collapsed window edge length in points.
pub const COLLAPSED_SIZE: f64 = 80.0;

/// Expanded window edge length in points.
pub const EXPANDED_SIZE: f64 = 400.0;

/// Corner radius of the widget background.
pub const CORNER_RADIUS: f64 = 40.0;

/// Distance from the screen's top-right corner at launch.
pub const WIDGET_MARGIN: f64 = 40.0;

/// Collapsed fill color (R, G, B, A), a deep cyan.
pub const COLLAPSED_COLOR: (f64, f64, f64, f64) = (2.7 / 255.0, 101.0 / 255.0, 155.0 / 255.0, 1.0);

/// Expanded fill color (R, G, B, A) - system blue.
pub const EXPANDED_COLOR: (f64, f64, f64, f64) = (0.0, 0.48, 1.0, 1.0);

// === Timing ===

/// Quiet period after hover-exit before the window collapses.
pub const COLLAPSE_DELAY: Duration = Duration::from_millis(500);

/// Delay between deferred editor batches.
pub const BATCH_DELAY: Duration = Duration::from_millis(500);

/// Interval of the main-thread timer that drains the event bus.
pub const EVENT_TICK_SECS: f64 = 0.05;

// === NSUserDefaults Keys ===

/// Key for the security-scoped bookmark of the authorized directory.
pub const PREF_DIRECTORY_BOOKMARK: &str = "DuMemoAuthorizedDirectoryBookmark";

// === Opener Limits ===

/// Maximum number of files passed to the editor in the primary attempt.
pub const MAX_PRIMARY_FILES: usize = 20;

/// Number of files per deferred batch after "too many open files".
pub const BATCH_SIZE: usize = 10;

/// Search path handed to the editor process.
pub const EDITOR_SEARCH_PATH: &str = "/usr/bin:/bin:/usr/sbin:/sbin";

/// Shell used for the bare-name editor fallback.
pub const FALLBACK_SHELL: &str = "/bin/sh";
