//! Trace 事件模型
//!
//! 每条记录保留原始的有序 JSON object（原样写回），同时在加载时分类为
//! `Sent` / `Received` / `Other`，并把本工具关心的字段解码为强类型。

use super::packet_number::parse_packet_number;
use super::schema::QlogSchema;
use super::space::PacketSpace;
use crate::ack::AckRanges;
use crate::error::AnnotateError;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, info};

/// 发送事件中解码出的字段
#[derive(Debug, Clone, PartialEq)]
pub struct SentPacket {
    pub space: PacketSpace,
    pub packet_number: u64,
    /// 不解释，只复制
    pub time: Value,
    pub frame_types: String,
}

/// 接收事件中解码出的 ACK 信息
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedAck {
    pub space: PacketSpace,
    pub ack_ranges: AckRanges,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Sent(SentPacket),
    Received(ReceivedAck),
    Other,
}

/// 一条 trace 记录
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEvent {
    kind: EventKind,
    fields: Map<String, Value>,
}

impl TraceEvent {
    /// 分类并解码；已识别事件缺少必需字段时返回致命错误（事件下标由调用方补上）
    pub fn classify(fields: Map<String, Value>, schema: &QlogSchema) -> Result<Self, AnnotateError> {
        let kind = classify_kind(&fields, schema)?;
        Ok(Self { kind, fields })
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn name(&self, schema: &QlogSchema) -> Option<&str> {
        self.fields.get(schema.name_field).and_then(Value::as_str)
    }

    /// 写入字段；已有字段保持原位置
    pub(crate) fn set_field(&mut self, key: &str, value: Value) {
        self.fields.insert(key.to_string(), value);
    }
}

impl Serialize for TraceEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

fn classify_kind(fields: &Map<String, Value>, schema: &QlogSchema) -> Result<EventKind, AnnotateError> {
    let Some(name) = fields.get(schema.name_field).and_then(Value::as_str) else {
        return Ok(EventKind::Other);
    };
    let is_sent = name == schema.sent_name;
    if !is_sent && name != schema.received_name {
        return Ok(EventKind::Other);
    }

    let tag = fields.get(schema.space_field).and_then(Value::as_str);
    let Some(space) = tag.and_then(|t| schema.space_from_tag(t)) else {
        debug!(event_name = name, space = ?tag, "未知 packet space，按 Other 处理");
        return Ok(EventKind::Other);
    };

    if is_sent {
        decode_sent(fields, schema, space).map(EventKind::Sent)
    } else {
        let ack_ranges = AckRanges::from_value(fields.get(schema.ack_ranges_field))?;
        Ok(EventKind::Received(ReceivedAck { space, ack_ranges }))
    }
}

fn decode_sent(
    fields: &Map<String, Value>,
    schema: &QlogSchema,
    space: PacketSpace,
) -> Result<SentPacket, AnnotateError> {
    let missing = |field: &'static str| AnnotateError::MissingField {
        index: 0,
        field,
        space: space.as_str(),
    };

    let raw_pn = present(fields, schema.packet_number_field)
        .ok_or_else(|| missing(schema.packet_number_field))?;
    let packet_number =
        parse_packet_number(raw_pn).ok_or_else(|| AnnotateError::InvalidPacketNumber {
            index: 0,
            value: raw_pn.clone(),
        })?;
    let time = present(fields, schema.time_field)
        .cloned()
        .ok_or_else(|| missing(schema.time_field))?;
    let frame_types = fields
        .get(schema.frame_types_field)
        .and_then(Value::as_str)
        .ok_or_else(|| missing(schema.frame_types_field))?
        .to_string();

    Ok(SentPacket {
        space,
        packet_number,
        time,
        frame_types,
    })
}

/// 缺失与 null 同等对待
fn present<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    fields.get(key).filter(|v| !v.is_null())
}

/// 整条 trace：有序事件序列
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Trace {
    events: Vec<TraceEvent>,
}

impl Trace {
    /// 从已解析的 JSON 构建；所有致命的字段/编码错误都在这里暴露
    #[tracing::instrument(skip_all)]
    pub fn from_value(value: Value, schema: &QlogSchema) -> Result<Self, AnnotateError> {
        let Value::Array(items) = value else {
            return Err(AnnotateError::NotAnEventArray);
        };

        let mut events = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let Value::Object(fields) = item else {
                return Err(AnnotateError::NotAnEventObject { index });
            };
            let event = TraceEvent::classify(fields, schema).map_err(|e| e.at_event(index))?;
            events.push(event);
        }

        info!(events = events.len(), "trace 已加载");
        Ok(Self { events })
    }

    pub fn from_json_str(raw: &str, schema: &QlogSchema) -> Result<Self, AnnotateError> {
        Self::from_value(serde_json::from_str(raw)?, schema)
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub(crate) fn events_mut(&mut self) -> &mut [TraceEvent] {
        &mut self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
