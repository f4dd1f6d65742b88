//! PTO 诊断标注
//!
//! 此模块把发送索引、已确认集合追踪与 ack-eliciting 判定串成两遍扫描，
//! 为每个接收 ACK 事件写入 `cc_max_ack_sent_time` 与 `cc_newly_acked_ack_eliciting`。

// 子模块声明
mod pipeline;
mod sent_index;
mod summary;

// 重新导出公共接口
pub use pipeline::{annotate, annotate_file, load_trace, write_trace};
pub use sent_index::{SentIndex, SentInfo};
pub use summary::AnnotationSummary;
