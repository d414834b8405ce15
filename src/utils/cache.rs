//! High-Performance In-Memory Cache Module
//!
//! Thread-safe caching layer untuk hasil analisis token.
//! Menggunakan DashMap untuk concurrent access tanpa lock contention.
//!
//! Features:
//! - TTL-based expiration (5 menit default)
//! - Cache HIT/MISS logging
//! - Thread-safe dengan DashMap
//!
//! Perhatian: mint address base58 itu case-sensitive, jadi key TIDAK
//! boleh di-lowercase.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::models::types::TokenAnalysis;
use crate::utils::constants::DEFAULT_CACHE_TTL_SECS;

/// Cache entry dengan timestamp untuk TTL validation
#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub analysis: TokenAnalysis,
    pub created_at: Instant,
    pub ttl_secs: u64,
}

impl CacheEntry {
    /// Cek apakah entry sudah expired
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > Duration::from_secs(self.ttl_secs)
    }

    /// Sisa waktu sebelum expired (dalam detik)
    pub fn remaining_ttl(&self) -> u64 {
        let elapsed = self.created_at.elapsed().as_secs();
        self.ttl_secs.saturating_sub(elapsed)
    }
}

/// Analysis cache, keyed by mint address
#[derive(Clone)]
pub struct AnalysisCache {
    store: Arc<DashMap<String, CacheEntry>>,
    ttl_secs: u64,
    hits: Arc<std::sync::atomic::AtomicU64>,
    misses: Arc<std::sync::atomic::AtomicU64>,
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisCache {
    /// Buat cache baru dengan TTL default (5 menit)
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL_SECS)
    }

    /// Buat cache dengan custom TTL
    pub fn with_ttl(ttl_secs: u64) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            ttl_secs,
            hits: Arc::new(std::sync::atomic::AtomicU64::new(0)),
            misses: Arc::new(std::sync::atomic::AtomicU64::new(0)),
        }
    }

    /// Get dari cache dengan TTL validation
    pub fn get(&self, mint: &str) -> Option<TokenAnalysis> {
        if let Some(entry) = self.store.get(mint) {
            if entry.is_expired() {
                drop(entry); // Release read lock
                self.store.remove(mint);
                self.misses
                    .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                debug!("📭 CACHE MISS (expired): {}", mint);
                None
            } else {
                self.hits.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                let remaining = entry.remaining_ttl();
                info!("✅ CACHE HIT: {} (TTL: {}s remaining)", mint, remaining);
                Some(entry.analysis.clone())
            }
        } else {
            self.misses
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            debug!("📭 CACHE MISS: {}", mint);
            None
        }
    }

    /// Set ke cache dengan TTL default
    pub fn set(&self, mint: &str, analysis: TokenAnalysis) {
        let entry = CacheEntry {
            analysis,
            created_at: Instant::now(),
            ttl_secs: self.ttl_secs,
        };

        self.store.insert(mint.to_string(), entry);
        info!("💾 CACHE SET: {} (TTL: {}s)", mint, self.ttl_secs);
    }

    /// Hapus entry dari cache (force re-analysis)
    pub fn invalidate(&self, mint: &str) {
        self.store.remove(mint);
        debug!("🗑️ CACHE INVALIDATE: {}", mint);
    }

    /// Bersihkan semua entry yang expired
    pub fn cleanup_expired(&self) -> usize {
        let before = self.store.len();
        self.store.retain(|_, entry| !entry.is_expired());
        let removed = before - self.store.len();
        if removed > 0 {
            info!("🧹 CACHE CLEANUP: {} expired entries removed", removed);
        }
        removed
    }

    /// Get statistik cache
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(std::sync::atomic::Ordering::Relaxed);
        let misses = self.misses.load(std::sync::atomic::Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            entries: self.store.len(),
            hits,
            misses,
            hit_rate,
            ttl_secs: self.ttl_secs,
        }
    }
}

/// Statistik cache untuk monitoring
#[derive(Debug, Clone, serde::Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub ttl_secs: u64,
}
