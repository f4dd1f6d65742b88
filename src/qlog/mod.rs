//! qlog trace 模型
//!
//! 此模块负责 trace 记录的分类与字段解码：事件类型、packet number space、
//! packet number，以及集中管理的字面量表。

// 子模块声明
mod event;
mod packet_number;
mod schema;
mod space;

// 重新导出公共接口
pub use event::{EventKind, ReceivedAck, SentPacket, Trace, TraceEvent};
pub use packet_number::parse_packet_number;
pub use schema::QlogSchema;
pub use space::{PacketSpace, PerSpace};
