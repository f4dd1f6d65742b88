mod annotate;

use crate::qlog::QlogSchema;
use serde_json::{json, Value};

const SCHEMA: QlogSchema = QlogSchema::QLOG;

pub(crate) fn sent_event(space: &str, pn: Value, time: Value, frames: &str) -> Value {
    json!({
        "time": time,
        "name": SCHEMA.sent_name,
        "data_header_packet_type": space,
        "data_header_packet_number": pn,
        "frame_frame_type": frames,
    })
}

pub(crate) fn ack_event(space: &str, time: Value, ranges: &str) -> Value {
    json!({
        "time": time,
        "name": SCHEMA.received_name,
        "data_header_packet_type": space,
        "frame_frame_type": "ack",
        "frame_acked_ranges": ranges,
    })
}
