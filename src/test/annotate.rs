use super::{ack_event, sent_event, SCHEMA};
use crate::annotate::annotate;
use crate::qlog::Trace;
use serde_json::{json, Value};

fn run(events: Value) -> (Vec<Value>, crate::annotate::AnnotationSummary) {
    let mut trace = Trace::from_value(events, &SCHEMA).expect("load");
    let summary = annotate(&mut trace, &SCHEMA);
    let out = serde_json::to_value(&trace).expect("serialize");
    let Value::Array(out) = out else {
        panic!("trace must serialize to an array");
    };
    (out, summary)
}

fn derived(ev: &Value) -> (Option<&Value>, Option<&Value>) {
    (
        ev.get(SCHEMA.max_ack_sent_time_field),
        ev.get(SCHEMA.newly_acked_eliciting_field),
    )
}

#[test]
fn newly_acked_eliciting_packet_sets_time_and_flag() {
    let (out, summary) = run(json!([
        sent_event("1RTT", json!(5), json!(10), "stream,ack"),
        ack_event("1RTT", json!(30), "[5,5]"),
    ]));
    assert_eq!(derived(&out[1]), (Some(&json!(10)), Some(&json!(true))));
    assert_eq!(derived(&out[0]), (None, None));
    assert_eq!(summary.annotated, 1);
    assert_eq!(summary.newly_acked_eliciting, 1);
    assert_eq!(summary.sent, 1);
    assert_eq!(summary.received, 1);
}

#[test]
fn ack_and_padding_only_packet_is_not_eliciting() {
    let (out, _) = run(json!([
        sent_event("1RTT", json!(0), json!(1), "ack,padding"),
        ack_event("1RTT", json!(2), "[0]"),
    ]));
    assert_eq!(derived(&out[1]), (Some(&json!(1)), Some(&json!(false))));
}

#[test]
fn redundant_ack_is_never_eliciting() {
    let (out, _) = run(json!([
        sent_event("1RTT", json!(1), json!(1), "stream"),
        sent_event("1RTT", json!(2), json!(2), "stream"),
        ack_event("1RTT", json!(3), "[1,2]"),
        ack_event("1RTT", json!(4), "[2,2]"),
        ack_event("1RTT", json!(5), "[1,2]"),
    ]));
    assert_eq!(derived(&out[2]), (Some(&json!(2)), Some(&json!(true))));
    assert_eq!(derived(&out[3]), (Some(&json!(2)), Some(&json!(false))));
    assert_eq!(derived(&out[4]), (Some(&json!(2)), Some(&json!(false))));
}

#[test]
fn only_newly_acked_packets_decide_the_flag() {
    // 1 已被确认；第二个 ACK 新增的 2 只含 ack frame
    let (out, _) = run(json!([
        sent_event("1RTT", json!(1), json!(1), "stream"),
        sent_event("1RTT", json!(2), json!(2), "ack"),
        sent_event("1RTT", json!(3), json!(3), "ping"),
        ack_event("1RTT", json!(4), "[1]"),
        ack_event("1RTT", json!(5), "[1,2]"),
        ack_event("1RTT", json!(6), "[1,3]"),
    ]));
    assert_eq!(derived(&out[3]), (Some(&json!(1)), Some(&json!(true))));
    assert_eq!(derived(&out[4]), (Some(&json!(2)), Some(&json!(false))));
    assert_eq!(derived(&out[5]), (Some(&json!(3)), Some(&json!(true))));
}

#[test]
fn out_of_order_acks_use_the_highest_acked_packet() {
    let (out, _) = run(json!([
        sent_event("1RTT", json!(7), json!(70), "stream"),
        sent_event("1RTT", json!(8), json!(80), "stream"),
        ack_event("1RTT", json!(100), "[[7,8]]"),
        ack_event("1RTT", json!(101), "[7]"),
    ]));
    assert_eq!(derived(&out[2]), (Some(&json!(80)), Some(&json!(true))));
    assert_eq!(derived(&out[3]), (Some(&json!(70)), Some(&json!(false))));
}

#[test]
fn spaces_do_not_share_acked_state() {
    let (out, _) = run(json!([
        sent_event("initial", json!(0), json!("i0"), "crypto"),
        sent_event("handshake", json!(0), json!("h0"), "crypto"),
        ack_event("initial", json!(1), "[0]"),
        ack_event("handshake", json!(2), "[0]"),
        ack_event("initial", json!(3), "[0]"),
    ]));
    assert_eq!(derived(&out[2]), (Some(&json!("i0")), Some(&json!(true))));
    assert_eq!(derived(&out[3]), (Some(&json!("h0")), Some(&json!(true))));
    assert_eq!(derived(&out[4]), (Some(&json!("i0")), Some(&json!(false))));
}

#[test]
fn missing_sent_record_writes_null_marker() {
    let (out, summary) = run(json!([
        sent_event("1RTT", json!(1), json!(1), "stream"),
        ack_event("1RTT", json!(2), "[1,4]"),
    ]));
    assert_eq!(derived(&out[1]), (Some(&Value::Null), Some(&json!(true))));
    assert_eq!(summary.lookup_misses, 1);
}

#[test]
fn empty_ack_and_unknown_space_pass_through() {
    let input = json!([
        ack_event("1RTT", json!(1), ""),
        ack_event("0RTT", json!(2), "[0]"),
        { "name": "recovery:metrics_updated", "time": 3, "smoothed_rtt": 12.5 },
    ]);
    let (out, summary) = run(input.clone());
    assert_eq!(Value::Array(out), input);
    assert_eq!(summary.empty_acks, 1);
    assert_eq!(summary.unknown_space, 1);
    assert_eq!(summary.annotated, 0);
    assert_eq!(summary.events, 3);
}

#[test]
fn non_ack_events_and_unknown_fields_are_untouched() {
    let other = json!({ "name": "transport:parameters_set", "time": 0, "owner": "local", "extra": [1, {"a": null}] });
    let sent = sent_event("1RTT", json!("9"), json!(9.5), "stream");
    let mut ack = ack_event("1RTT", json!(11), "[9]");
    ack.as_object_mut()
        .expect("object")
        .insert("frame_ack_delay".to_string(), json!(25));

    let (out, _) = run(json!([other.clone(), sent.clone(), ack]));
    assert_eq!(out[0], other);
    assert_eq!(out[1], sent);
    assert_eq!(out[2].get("frame_ack_delay"), Some(&json!(25)));
    assert_eq!(out[2].get("frame_acked_ranges"), Some(&json!("[9]")));
    assert_eq!(derived(&out[2]), (Some(&json!(9.5)), Some(&json!(true))));
}

#[test]
fn reannotation_is_idempotent() {
    let input = json!([
        sent_event("initial", json!(0), json!(1), "crypto"),
        sent_event("1RTT", json!(1), json!(2), "stream"),
        sent_event("1RTT", json!(2), json!(3), "ack"),
        ack_event("initial", json!(4), "[0]"),
        ack_event("1RTT", json!(5), "[1,2]"),
        ack_event("1RTT", json!(6), "[2]"),
        ack_event("1RTT", json!(7), "[3,5]"),
    ]);
    let (first, first_summary) = run(input);
    let (second, second_summary) = run(Value::Array(first.clone()));
    assert_eq!(first, second);
    assert_eq!(first_summary, second_summary);
}

#[test]
fn stale_derived_fields_are_overwritten_in_place() {
    let mut ack = ack_event("1RTT", json!(2), "[0]");
    let obj = ack.as_object_mut().expect("object");
    obj.insert(SCHEMA.max_ack_sent_time_field.to_string(), json!("bogus"));
    obj.insert(SCHEMA.newly_acked_eliciting_field.to_string(), json!(false));
    obj.insert("after".to_string(), json!(1));

    let (out, _) = run(json!([sent_event("1RTT", json!(0), json!(1), "ping"), ack]));
    assert_eq!(derived(&out[1]), (Some(&json!(1)), Some(&json!(true))));
    let keys: Vec<&String> = out[1].as_object().expect("object").keys().collect();
    assert_eq!(keys.last().map(|k| k.as_str()), Some("after"));
}

#[test]
fn numbers_are_written_back_with_their_original_text() {
    let raw = concat!(
        r#"[{"name":"x","big":123456789012345678901234,"f":1.10},"#,
        r#"{"time":10.10,"name":"transport:packet_sent","data_header_packet_type":"1RTT","data_header_packet_number":5,"frame_frame_type":"stream"},"#,
        r#"{"time":12.000,"name":"transport:packet_received","data_header_packet_type":"1RTT","frame_acked_ranges":"[5]","ack_delay":18446744073709551616}]"#,
    );
    let mut trace = Trace::from_json_str(raw, &SCHEMA).expect("load");
    annotate(&mut trace, &SCHEMA);
    let out = serde_json::to_string(&trace).expect("serialize");

    let expected = concat!(
        r#"[{"name":"x","big":123456789012345678901234,"f":1.10},"#,
        r#"{"time":10.10,"name":"transport:packet_sent","data_header_packet_type":"1RTT","data_header_packet_number":5,"frame_frame_type":"stream"},"#,
        r#"{"time":12.000,"name":"transport:packet_received","data_header_packet_type":"1RTT","frame_acked_ranges":"[5]","ack_delay":18446744073709551616,"cc_max_ack_sent_time":10.10,"cc_newly_acked_ack_eliciting":true}]"#,
    );
    assert_eq!(out, expected);
}
