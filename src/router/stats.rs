//! 路由统计
//!
//! 无锁计数器，记录路由结果和端到端延迟。

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::utils::ErrorKind;

/// 路由统计信息
#[derive(Debug)]
pub struct RouteStats {
    /// 总调用数
    total_invocations: AtomicU64,
    /// 成功数
    successful: AtomicU64,
    /// 失败数
    failed: AtomicU64,
    /// 发送失败数
    send_failures: AtomicU64,
    /// 总延迟（微秒）
    total_latency_us: AtomicU64,
    /// 最小延迟（微秒）
    min_latency_us: AtomicU64,
    /// 最大延迟（微秒）
    max_latency_us: AtomicU64,
    /// 按错误分类计数，下标见 [`ErrorKind::index`]
    by_kind: [AtomicU64; ErrorKind::ALL.len()],
}

impl Default for RouteStats {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteStats {
    /// 创建新的统计实例
    pub fn new() -> Self {
        Self {
            total_invocations: AtomicU64::new(0),
            successful: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            send_failures: AtomicU64::new(0),
            total_latency_us: AtomicU64::new(0),
            min_latency_us: AtomicU64::new(u64::MAX),
            max_latency_us: AtomicU64::new(0),
            by_kind: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }

    /// 记录一次路由结果，`error` 为 `None` 表示成功
    pub fn record(&self, error: Option<ErrorKind>, latency_us: u64) {
        self.total_invocations.fetch_add(1, Ordering::Relaxed);
        self.total_latency_us.fetch_add(latency_us, Ordering::Relaxed);

        match error {
            None => {
                self.successful.fetch_add(1, Ordering::Relaxed);
            }
            Some(kind) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                self.by_kind[kind.index()].fetch_add(1, Ordering::Relaxed);
            }
        }

        self.min_latency_us.fetch_min(latency_us, Ordering::Relaxed);

        let mut current_max = self.max_latency_us.load(Ordering::Relaxed);
        while latency_us > current_max {
            match self.max_latency_us.compare_exchange_weak(
                current_max,
                latency_us,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => current_max = actual,
            }
        }
    }

    /// 记录一次发送失败
    pub fn record_send_failure(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// 获取统计快照
    pub fn snapshot(&self) -> RouteStatsSnapshot {
        let total = self.total_invocations.load(Ordering::Relaxed);
        let successful = self.successful.load(Ordering::Relaxed);
        let total_latency = self.total_latency_us.load(Ordering::Relaxed);
        let min_latency = self.min_latency_us.load(Ordering::Relaxed);

        let errors = ErrorKind::ALL
            .iter()
            .filter_map(|kind| {
                let count = self.by_kind[kind.index()].load(Ordering::Relaxed);
                (count > 0).then_some((*kind, count))
            })
            .collect();

        RouteStatsSnapshot {
            total_invocations: total,
            successful,
            failed: self.failed.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            success_rate: if total > 0 { successful as f64 / total as f64 } else { 0.0 },
            avg_latency_us: if total > 0 { total_latency / total } else { 0 },
            min_latency_us: if min_latency == u64::MAX { 0 } else { min_latency },
            max_latency_us: self.max_latency_us.load(Ordering::Relaxed),
            errors,
        }
    }

    /// 重置统计
    pub fn reset(&self) {
        self.total_invocations.store(0, Ordering::Relaxed);
        self.successful.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        self.send_failures.store(0, Ordering::Relaxed);
        self.total_latency_us.store(0, Ordering::Relaxed);
        self.min_latency_us.store(u64::MAX, Ordering::Relaxed);
        self.max_latency_us.store(0, Ordering::Relaxed);
        for counter in &self.by_kind {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// 路由统计快照
#[derive(Debug, Clone, Serialize)]
pub struct RouteStatsSnapshot {
    /// 总调用数
    pub total_invocations: u64,
    /// 成功数
    pub successful: u64,
    /// 失败数
    pub failed: u64,
    /// 发送失败数
    pub send_failures: u64,
    /// 成功率
    pub success_rate: f64,
    /// 平均延迟（微秒）
    pub avg_latency_us: u64,
    /// 最小延迟（微秒）
    pub min_latency_us: u64,
    /// 最大延迟（微秒）
    pub max_latency_us: u64,
    /// 按错误分类计数（只含非零项）
    pub errors: BTreeMap<ErrorKind, u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats() {
        let stats = RouteStats::new();

        stats.record(None, 1000);
        stats.record(None, 2000);
        stats.record(Some(ErrorKind::Forbidden), 3000);
        stats.record_send_failure();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_invocations, 3);
        assert_eq!(snapshot.successful, 2);
        assert_eq!(snapshot.failed, 1);
        assert_eq!(snapshot.send_failures, 1);
        assert_eq!(snapshot.min_latency_us, 1000);
        assert_eq!(snapshot.max_latency_us, 3000);
        assert_eq!(snapshot.avg_latency_us, 2000);
        assert_eq!(snapshot.errors.get(&ErrorKind::Forbidden), Some(&1));
        assert_eq!(snapshot.errors.len(), 1);
    }

    #[test]
    fn test_stats_reset() {
        let stats = RouteStats::new();

        stats.record(Some(ErrorKind::UnknownCommand), 1000);
        stats.reset();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_invocations, 0);
        assert_eq!(snapshot.min_latency_us, 0);
        assert!(snapshot.errors.is_empty());
    }

    #[test]
    fn test_snapshot_serializes_kind_names() {
        let stats = RouteStats::new();
        stats.record(Some(ErrorKind::NotFound), 10);

        let json = serde_json::to_value(stats.snapshot()).unwrap();
        assert_eq!(json["errors"]["not_found"], 1);
    }
}
