//! 发送记录索引（第一遍扫描）

use crate::ack::any_ack_eliciting;
use crate::qlog::{EventKind, PacketSpace, PerSpace, Trace};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use tracing::{info, warn};

/// 某个 (space, packet number) 的发送信息
#[derive(Debug, Clone, PartialEq)]
pub struct SentInfo {
    pub time: Value,
    pub frame_types: String,
}

/// 每个 space 的 packet number -> SentInfo
#[derive(Debug, Default)]
pub struct SentIndex {
    spaces: PerSpace<HashMap<u64, SentInfo>>,
    duplicates: usize,
}

impl SentIndex {
    /// 按 trace 顺序扫描所有发送事件
    #[tracing::instrument(skip_all, fields(events = trace.len()))]
    pub fn build(trace: &Trace) -> Self {
        let mut index = Self::default();
        for event in trace.events() {
            if let EventKind::Sent(sent) = event.kind() {
                index.insert(
                    sent.space,
                    sent.packet_number,
                    SentInfo {
                        time: sent.time.clone(),
                        frame_types: sent.frame_types.clone(),
                    },
                );
            }
        }
        info!(
            initial = index.len(PacketSpace::Initial),
            handshake = index.len(PacketSpace::Handshake),
            one_rtt = index.len(PacketSpace::OneRtt),
            duplicates = index.duplicates,
            "发送索引已建立"
        );
        index
    }

    /// 插入；同一 space 内重复的 packet number 以后出现者为准，并返回被覆盖的旧值
    pub fn insert(&mut self, space: PacketSpace, pn: u64, info: SentInfo) -> Option<SentInfo> {
        let previous = self.spaces[space].insert(pn, info);
        if previous.is_some() {
            self.duplicates += 1;
            warn!(space = %space, pn, "重复的发送记录，覆盖先前的记录");
        }
        previous
    }

    pub fn get(&self, space: PacketSpace, pn: u64) -> Option<&SentInfo> {
        self.spaces[space].get(&pn)
    }

    pub fn len(&self, space: PacketSpace) -> usize {
        self.spaces[space].len()
    }

    pub fn is_empty(&self) -> bool {
        self.spaces.iter().all(|(_, packets)| packets.is_empty())
    }

    /// 被覆盖的重复发送记录数
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// `newly` 中是否有索引内的 ack-eliciting packet
    pub fn any_ack_eliciting(&self, space: PacketSpace, newly: &BTreeSet<u64>) -> bool {
        let packets = &self.spaces[space];
        any_ack_eliciting(newly.iter().copied(), |pn| {
            packets.get(&pn).map(|info| info.frame_types.as_str())
        })
    }
}
