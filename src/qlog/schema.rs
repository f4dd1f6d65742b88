//! 字段名与标签常量表
//!
//! 所有 trace 中出现的字面量（事件名、packet space 标签、字段名、派生字段名）集中在这里，
//! 分类器与标注流程只通过 `QlogSchema` 访问它们。

use super::space::PacketSpace;

/// 逻辑角色到 trace 字面量的映射
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QlogSchema {
    /// 事件类型字段
    pub name_field: &'static str,
    pub sent_name: &'static str,
    pub received_name: &'static str,
    /// packet number space 字段
    pub space_field: &'static str,
    pub initial_tag: &'static str,
    pub handshake_tag: &'static str,
    pub one_rtt_tag: &'static str,
    pub packet_number_field: &'static str,
    pub time_field: &'static str,
    /// 逗号拼接的 frame 类型列表
    pub frame_types_field: &'static str,
    pub ack_ranges_field: &'static str,
    /// 派生字段：最大被确认 packet 的发送时间
    pub max_ack_sent_time_field: &'static str,
    /// 派生字段：新确认的 packet 中是否有 ack-eliciting 的
    pub newly_acked_eliciting_field: &'static str,
}

impl QlogSchema {
    /// 扁平化 qlog（每个事件一个 JSON object）使用的字面量
    pub const QLOG: QlogSchema = QlogSchema {
        name_field: "name",
        sent_name: "transport:packet_sent",
        received_name: "transport:packet_received",
        space_field: "data_header_packet_type",
        initial_tag: "initial",
        handshake_tag: "handshake",
        one_rtt_tag: "1RTT",
        packet_number_field: "data_header_packet_number",
        time_field: "time",
        frame_types_field: "frame_frame_type",
        ack_ranges_field: "frame_acked_ranges",
        max_ack_sent_time_field: "cc_max_ack_sent_time",
        newly_acked_eliciting_field: "cc_newly_acked_ack_eliciting",
    };

    pub fn space_tag(&self, space: PacketSpace) -> &'static str {
        match space {
            PacketSpace::Initial => self.initial_tag,
            PacketSpace::Handshake => self.handshake_tag,
            PacketSpace::OneRtt => self.one_rtt_tag,
        }
    }

    /// 精确匹配 space 标签；未知标签返回 None
    pub fn space_from_tag(&self, tag: &str) -> Option<PacketSpace> {
        PacketSpace::ALL
            .into_iter()
            .find(|space| self.space_tag(*space) == tag)
    }
}

impl Default for QlogSchema {
    fn default() -> Self {
        Self::QLOG
    }
}
