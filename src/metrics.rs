//! Lightweight global metrics.
//!
//! Атомарные счётчики страничного ввода-вывода и сплитов; снимок
//! используется тестами (границы числа чтений при перечислении вёдер)
//! и выводом `stats --json`.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

// ----- Page I/O -----
static PAGES_READ: AtomicU64 = AtomicU64::new(0);
static PAGES_WRITTEN: AtomicU64 = AtomicU64::new(0);
static PAGES_ALLOCATED: AtomicU64 = AtomicU64::new(0);
static OVFLOW_PAGES_ALLOCATED: AtomicU64 = AtomicU64::new(0);

// ----- Splits -----
static SPLITS: AtomicU64 = AtomicU64::new(0);
static SPLIT_TUPLES_MOVED: AtomicU64 = AtomicU64::new(0);

#[inline]
pub fn record_page_read() {
    PAGES_READ.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub fn record_page_write() {
    PAGES_WRITTEN.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub fn record_page_alloc() {
    PAGES_ALLOCATED.fetch_add(1, Ordering::Relaxed);
}

/// Страницы, дописанные в хвост цепочки переполнения (поверх общего
/// счётчика аллокаций).
#[inline]
pub fn record_ovflow_page_alloc() {
    OVFLOW_PAGES_ALLOCATED.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub fn record_split() {
    SPLITS.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub fn record_split_tuple_moved() {
    SPLIT_TUPLES_MOVED.fetch_add(1, Ordering::Relaxed);
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsSnapshot {
    pub pages_read: u64,
    pub pages_written: u64,
    pub pages_allocated: u64,
    pub ovflow_pages_allocated: u64,
    pub splits: u64,
    pub split_tuples_moved: u64,
}

/// Снять текущие значения счётчиков. Счётчики процессные и монотонные;
/// интересующийся дельтой снимает их до и после операции.
pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        pages_read: PAGES_READ.load(Ordering::Relaxed),
        pages_written: PAGES_WRITTEN.load(Ordering::Relaxed),
        pages_allocated: PAGES_ALLOCATED.load(Ordering::Relaxed),
        ovflow_pages_allocated: OVFLOW_PAGES_ALLOCATED.load(Ordering::Relaxed),
        splits: SPLITS.load(Ordering::Relaxed),
        split_tuples_moved: SPLIT_TUPLES_MOVED.load(Ordering::Relaxed),
    }
}
