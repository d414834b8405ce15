//! Telemetry Module for Pumpwatch
//!
//! Collects anonymous statistics about analyses and detected threats for
//! performance monitoring and periodic reports.
//!
//! Privacy-first: no wallet addresses stored, mints only appear in
//! buffered events, never in aggregate exports.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Telemetry event types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ThreatType {
    HighRisk,
    HolderConcentration,
    LiquidityRemoval,
    Honeypot,
    WashTrading,
    AnalysisFailed,
}

impl ThreatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatType::HighRisk => "high_risk",
            ThreatType::HolderConcentration => "holder_concentration",
            ThreatType::LiquidityRemoval => "liquidity_removal",
            ThreatType::Honeypot => "honeypot",
            ThreatType::WashTrading => "wash_trading",
            ThreatType::AnalysisFailed => "analysis_failed",
        }
    }
}

/// Single telemetry event (anonymized)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryEvent {
    /// Unix timestamp
    pub timestamp: u64,
    pub threat_type: ThreatType,
    /// Analysis latency in milliseconds
    pub latency_ms: u64,
    /// Overall risk score (0-100) at detection time
    pub risk_score: u8,
    /// Additional context (no PII)
    pub context: String,
}

impl TelemetryEvent {
    pub fn new(threat_type: ThreatType, latency_ms: u64, risk_score: u8, context: String) -> Self {
        Self {
            timestamp: current_timestamp(),
            threat_type,
            latency_ms,
            risk_score,
            context,
        }
    }
}

/// Aggregated statistics for reporting
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TelemetryStats {
    /// Total analyses run
    pub total_analyzed: u64,
    /// Total threats detected
    pub total_threats: u64,
    /// Threats by type
    pub threats_by_type: HashMap<String, u64>,
    /// Average analysis latency (ms)
    pub avg_latency_ms: f64,
    /// Period start timestamp
    pub period_start: u64,
    /// Period end timestamp
    pub period_end: u64,
    /// Honeypots detected (highlight metric)
    pub honeypots_detected: u64,
}

impl TelemetryStats {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Export as CSV row
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{:.2},{}\n",
            self.period_start,
            self.period_end,
            self.total_analyzed,
            self.total_threats,
            self.avg_latency_ms,
            self.honeypots_detected,
        )
    }
}

/// Main telemetry collector
pub struct TelemetryCollector {
    /// Event buffer (in-memory)
    events: RwLock<Vec<TelemetryEvent>>,
    /// Atomic counters for fast updates
    total_analyzed: AtomicU64,
    total_threats: AtomicU64,
    honeypots_detected: AtomicU64,
    total_latency_ms: AtomicU64,
    /// Threat counters by type
    threat_counts: RwLock<HashMap<ThreatType, u64>>,
    /// Session start time
    session_start: u64,
    /// Export directory
    export_dir: PathBuf,
    /// Max events in memory before flush
    max_buffer_size: usize,
}

impl TelemetryCollector {
    pub fn new() -> Self {
        Self::with_config(PathBuf::from("./telemetry"), 1000)
    }

    pub fn with_config(export_dir: PathBuf, max_buffer_size: usize) -> Self {
        let _ = fs::create_dir_all(&export_dir);

        Self {
            events: RwLock::new(Vec::with_capacity(max_buffer_size)),
            total_analyzed: AtomicU64::new(0),
            total_threats: AtomicU64::new(0),
            honeypots_detected: AtomicU64::new(0),
            total_latency_ms: AtomicU64::new(0),
            threat_counts: RwLock::new(HashMap::new()),
            session_start: current_timestamp(),
            export_dir,
            max_buffer_size,
        }
    }

    /// Record an analysis that found no threat
    pub fn record_analysis(&self, latency_ms: u64) {
        self.total_analyzed.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms
            .fetch_add(latency_ms, Ordering::Relaxed);
    }

    /// Record a detected threat
    pub fn record_threat(&self, event: TelemetryEvent) {
        self.total_analyzed.fetch_add(1, Ordering::Relaxed);
        self.total_threats.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms
            .fetch_add(event.latency_ms, Ordering::Relaxed);

        if event.threat_type == ThreatType::Honeypot {
            self.honeypots_detected.fetch_add(1, Ordering::Relaxed);
        }

        if let Ok(mut counts) = self.threat_counts.write() {
            *counts.entry(event.threat_type.clone()).or_insert(0) += 1;
        }

        if let Ok(mut events) = self.events.write() {
            events.push(event);

            // Auto-flush if buffer full
            if events.len() >= self.max_buffer_size {
                let events_to_flush = std::mem::take(&mut *events);
                drop(events); // Release lock before I/O
                let _ = self.flush_events(&events_to_flush);
            }
        }
    }

    /// Get current statistics
    pub fn get_stats(&self) -> TelemetryStats {
        let total_analyzed = self.total_analyzed.load(Ordering::Relaxed);
        let total_threats = self.total_threats.load(Ordering::Relaxed);
        let total_latency = self.total_latency_ms.load(Ordering::Relaxed);
        let honeypots = self.honeypots_detected.load(Ordering::Relaxed);

        let avg_latency = if total_analyzed > 0 {
            total_latency as f64 / total_analyzed as f64
        } else {
            0.0
        };

        let threats_by_type = self
            .threat_counts
            .read()
            .map(|counts| {
                counts
                    .iter()
                    .map(|(k, v)| (k.as_str().to_string(), *v))
                    .collect()
            })
            .unwrap_or_default();

        TelemetryStats {
            total_analyzed,
            total_threats,
            threats_by_type,
            avg_latency_ms: avg_latency,
            period_start: self.session_start,
            period_end: current_timestamp(),
            honeypots_detected: honeypots,
        }
    }

    /// Export current stats to JSON file
    pub fn export_stats_json(&self) -> Result<PathBuf, std::io::Error> {
        let stats = self.get_stats();
        let filename = format!("stats_{}.json", current_timestamp());
        let path = self.export_dir.join(filename);

        let json = serde_json::to_string_pretty(&stats)?;
        fs::write(&path, json)?;

        Ok(path)
    }

    /// Export stats to CSV (append mode)
    pub fn export_stats_csv(&self) -> Result<PathBuf, std::io::Error> {
        let stats = self.get_stats();
        let path = self.export_dir.join("telemetry_history.csv");

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

        // Write header if new file
        if file.metadata()?.len() == 0 {
            writeln!(
                file,
                "period_start,period_end,total_analyzed,total_threats,avg_latency_ms,honeypots_detected"
            )?;
        }

        write!(file, "{}", stats.to_csv_row())?;

        Ok(path)
    }

    /// Flush buffered events to disk
    fn flush_events(&self, events: &[TelemetryEvent]) -> Result<(), std::io::Error> {
        if events.is_empty() {
            return Ok(());
        }

        let filename = format!("events_{}.jsonl", current_timestamp());
        let path = self.export_dir.join(filename);

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

        for event in events {
            if let Ok(json) = serde_json::to_string(event) {
                writeln!(file, "{}", json)?;
            }
        }

        Ok(())
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
