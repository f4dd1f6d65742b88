//! 已确认集合追踪
//!
//! 每个 space 维护一个只增不减的 packet number 集合，按 trace 顺序计算每个 ACK
//! 新确认的增量。

use crate::qlog::{PacketSpace, PerSpace};
use std::collections::BTreeSet;
use tracing::trace;

/// 单个 space 中至今为止被确认过的 packet number（只追加）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AckedSet {
    acked: BTreeSet<u64>,
}

impl AckedSet {
    /// 合并候选集合，返回其中此前未被确认的部分
    pub fn reconcile(&mut self, candidate: &BTreeSet<u64>) -> BTreeSet<u64> {
        let newly: BTreeSet<u64> = candidate.difference(&self.acked).copied().collect();
        self.acked.extend(newly.iter().copied());
        newly
    }

    pub fn contains(&self, pn: u64) -> bool {
        self.acked.contains(&pn)
    }

    pub fn len(&self) -> usize {
        self.acked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.acked.is_empty()
    }
}

/// 三个 space 的已确认集合
#[derive(Debug, Default)]
pub struct AckTracker {
    spaces: PerSpace<AckedSet>,
}

impl AckTracker {
    pub fn reconcile(&mut self, space: PacketSpace, candidate: &BTreeSet<u64>) -> BTreeSet<u64> {
        let acked = &mut self.spaces[space];
        let newly = acked.reconcile(candidate);
        trace!(
            space = %space,
            candidate = candidate.len(),
            newly = newly.len(),
            acked = acked.len(),
            "合并 ACK range"
        );
        newly
    }

    pub fn acked(&self, space: PacketSpace) -> &AckedSet {
        &self.spaces[space]
    }
}
