//! Runtime toggles deciding where a record goes besides the sink.

use crate::config::RoutingConfig;
use crate::level::Level;
use std::sync::atomic::{AtomicBool, Ordering};

/// Independent per-level alert toggles plus the alerting and metrics masters.
///
/// Each flag is read once per record. Flipping a flag while records are in
/// flight only changes which branch later records take.
#[derive(Debug, Default)]
pub struct SeverityRouting {
    alerts_enabled: AtomicBool,
    metrics_enabled: AtomicBool,
    levels: [AtomicBool; 5],
}

impl SeverityRouting {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turns on every level the config enables. Levels that are already on
    /// stay on.
    pub fn enable_from(&self, config: &RoutingConfig) {
        let levels = [
            (Level::Info, config.info),
            (Level::Warn, config.warn),
            (Level::Critical, config.critical),
            (Level::Panic, config.panic),
            (Level::Fatal, config.fatal),
        ];
        for (level, enabled) in levels {
            if enabled {
                self.set_alert_level(level, true);
            }
        }
    }

    pub fn alerts_enabled(&self) -> bool {
        self.alerts_enabled.load(Ordering::Relaxed)
    }

    pub fn set_alerts_enabled(&self, enabled: bool) {
        self.alerts_enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn metrics_enabled(&self) -> bool {
        self.metrics_enabled.load(Ordering::Relaxed)
    }

    pub fn set_metrics_enabled(&self, enabled: bool) {
        self.metrics_enabled.store(enabled, Ordering::Relaxed);
    }

    /// Whether records of `level` are forwarded to the alert pipeline.
    pub fn alert_level(&self, level: Level) -> bool {
        self.levels[level.index()].load(Ordering::Relaxed)
    }

    pub fn set_alert_level(&self, level: Level, enabled: bool) {
        self.levels[level.index()].store(enabled, Ordering::Relaxed);
    }
}
