//! 标注统计

use serde::Serialize;
use std::fmt;

/// 一次标注运行的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnnotationSummary {
    pub events: usize,
    pub sent: usize,
    pub received: usize,
    /// 写入了派生字段的接收事件
    pub annotated: usize,
    /// ACK range 为空而未标注的接收事件
    pub empty_acks: usize,
    /// 事件名已识别但 space 未知的事件
    pub unknown_space: usize,
    pub duplicate_sent: usize,
    /// 最大被确认 packet 不在发送索引中
    pub lookup_misses: usize,
    pub newly_acked_eliciting: usize,
}

impl fmt::Display for AnnotationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "events={} sent={} received={} annotated={} empty_acks={} unknown_space={} duplicate_sent={} lookup_misses={} newly_acked_eliciting={}",
            self.events,
            self.sent,
            self.received,
            self.annotated,
            self.empty_acks,
            self.unknown_space,
            self.duplicate_sent,
            self.lookup_misses,
            self.newly_acked_eliciting
        )
    }
}
