//! ACK 相关的纯算法组件
//!
//! range 文本解码、已确认集合追踪与 ack-eliciting 判定，彼此独立、不依赖 trace 结构。

mod eliciting;
mod ranges;
mod tracker;

pub use eliciting::{any_ack_eliciting, is_ack_eliciting, NON_ELICITING_FRAMES};
pub use ranges::{AckRanges, MAX_PACKET_NUMBER, MAX_RANGE_SPAN};
pub use tracker::{AckTracker, AckedSet};
