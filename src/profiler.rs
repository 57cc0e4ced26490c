//! Per-phase tick timing.
//!
//! Attach with `SimWorld::enable_profiling()`, or build with the `profile`
//! feature to profile every controller from creation. Results are reported
//! through the logger.

use log::info;
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub const PHASE_SPAWN: &str = "spawn";
pub const PHASE_AVATAR: &str = "avatar";
pub const PHASE_ENTITIES: &str = "entities";
pub const PHASE_REAP: &str = "reap";

/// Tick phases in execution order.
pub const PHASES: [&str; 4] = [PHASE_SPAWN, PHASE_AVATAR, PHASE_ENTITIES, PHASE_REAP];

/// Accumulates timings for named phases.
#[derive(Debug, Default, Clone)]
pub struct Profiler {
    sections: HashMap<&'static str, SectionStats>,
    tick_count: u64,
}

/// Statistics for one phase.
#[derive(Debug, Default, Clone, Copy)]
pub struct SectionStats {
    pub total_time: Duration,
    pub call_count: u64,
    pub min_time: Option<Duration>,
    pub max_time: Option<Duration>,
}

impl SectionStats {
    pub fn avg_time(&self) -> Duration {
        if self.call_count == 0 {
            Duration::ZERO
        } else {
            self.total_time / self.call_count as u32
        }
    }

    fn record(&mut self, elapsed: Duration) {
        self.total_time += elapsed;
        self.call_count += 1;
        self.min_time = Some(self.min_time.map_or(elapsed, |m| m.min(elapsed)));
        self.max_time = Some(self.max_time.map_or(elapsed, |m| m.max(elapsed)));
    }
}

impl Profiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` and charges its duration to `name`.
    pub fn time_section<F, R>(&mut self, name: &'static str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        self.sections.entry(name).or_default().record(start.elapsed());
        result
    }

    pub fn tick(&mut self) {
        self.tick_count += 1;
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn get_section(&self, name: &str) -> Option<&SectionStats> {
        self.sections.get(name)
    }

    pub fn total_time(&self) -> Duration {
        self.sections.values().map(|s| s.total_time).sum()
    }

    /// One formatted line per phase, known phases first, then the rest by
    /// descending total time.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut names: Vec<&'static str> = PHASES
            .iter()
            .copied()
            .filter(|p| self.sections.contains_key(p))
            .collect();
        let mut extra: Vec<_> = self
            .sections
            .iter()
            .filter(|(name, _)| !PHASES.contains(*name))
            .collect();
        extra.sort_by(|a, b| b.1.total_time.cmp(&a.1.total_time));
        names.extend(extra.into_iter().map(|(name, _)| *name));

        let total = self.total_time();
        names
            .into_iter()
            .filter_map(|name| {
                let stats = self.sections.get(name)?;
                let pct = if total.as_nanos() > 0 {
                    stats.total_time.as_nanos() as f64 / total.as_nanos() as f64 * 100.0
                } else {
                    0.0
                };
                Some(format!(
                    "{:<10} total {:>10.2?}  avg {:>10.2?}  min {:>10.2?}  max {:>10.2?}  {:>5.1}%",
                    name,
                    stats.total_time,
                    stats.avg_time(),
                    stats.min_time.unwrap_or(Duration::ZERO),
                    stats.max_time.unwrap_or(Duration::ZERO),
                    pct
                ))
            })
            .collect()
    }

    pub fn log_summary(&self) {
        info!("profile over {} ticks", self.tick_count);
        for line in self.summary_lines() {
            info!("  {line}");
        }
        if self.tick_count > 0 {
            info!("  avg tick {:.2?}", self.total_time() / self.tick_count as u32);
        }
    }
}

/// Times `f` under `name` when a profiler is attached.
pub fn timed<R>(profiler: &mut Option<Profiler>, name: &'static str, f: impl FnOnce() -> R) -> R {
    match profiler {
        Some(p) => p.time_section(name, f),
        None => f(),
    }
}
