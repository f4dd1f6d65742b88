//! 错误类型
//!
//! 所有致命错误都在这里定义；非致命情况（未知 space、查找失败等）只记日志和计数。

use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AnnotateError {
    #[error("{op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid trace json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("trace must be a JSON array of events")]
    NotAnEventArray,
    #[error("event #{index} is not a JSON object")]
    NotAnEventObject { index: usize },
    #[error("event #{index}: malformed ack ranges at byte {offset}: {reason}")]
    MalformedAckRanges {
        index: usize,
        offset: usize,
        reason: String,
    },
    #[error("event #{index}: ack range group has {count} boundaries, expected pairs")]
    OddAckRangeBoundaries { index: usize, count: usize },
    #[error("event #{index} ({space}): missing required field `{field}`")]
    MissingField {
        index: usize,
        field: &'static str,
        space: &'static str,
    },
    #[error("event #{index}: cannot parse packet number from {value}")]
    InvalidPacketNumber { index: usize, value: Value },
}

impl AnnotateError {
    /// 给解析阶段产生的错误补上事件下标
    pub(crate) fn at_event(self, event_index: usize) -> Self {
        match self {
            Self::MalformedAckRanges { offset, reason, .. } => Self::MalformedAckRanges {
                index: event_index,
                offset,
                reason,
            },
            Self::OddAckRangeBoundaries { count, .. } => Self::OddAckRangeBoundaries {
                index: event_index,
                count,
            },
            Self::MissingField { field, space, .. } => Self::MissingField {
                index: event_index,
                field,
                space,
            },
            Self::InvalidPacketNumber { value, .. } => Self::InvalidPacketNumber {
                index: event_index,
                value,
            },
            other => other,
        }
    }
}
