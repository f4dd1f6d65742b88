//! 标注流程
//!
//! 加载 → 第一遍建立发送索引 → 第二遍按原顺序回放 ACK 并写入派生字段 → 原子写出。
//! 第二遍必须严格按 trace 顺序，"新确认" 才是相对于此前所有 ACK 而言的。

use super::sent_index::SentIndex;
use super::summary::AnnotationSummary;
use crate::ack::AckTracker;
use crate::error::AnnotateError;
use crate::qlog::{EventKind, QlogSchema, Trace};
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 对内存中的 trace 做两遍标注
///
/// 派生字段总是被覆盖、从不被读取，所以对已标注的 trace 再跑一次结果不变。
#[tracing::instrument(skip_all, fields(events = trace.len()))]
pub fn annotate(trace: &mut Trace, schema: &QlogSchema) -> AnnotationSummary {
    let sent = SentIndex::build(trace);

    let mut summary = AnnotationSummary {
        events: trace.len(),
        duplicate_sent: sent.duplicates(),
        ..AnnotationSummary::default()
    };
    let mut tracker = AckTracker::default();

    for (index, event) in trace.events_mut().iter_mut().enumerate() {
        let (max_ack_sent_time, eliciting) = match event.kind() {
            EventKind::Sent(_) => {
                summary.sent += 1;
                continue;
            }
            EventKind::Other => {
                let name = event.name(schema);
                if name == Some(schema.sent_name) || name == Some(schema.received_name) {
                    summary.unknown_space += 1;
                }
                continue;
            }
            EventKind::Received(ack) => {
                summary.received += 1;
                if ack.ack_ranges.is_empty() {
                    summary.empty_acks += 1;
                    continue;
                }

                let space = ack.space;
                let max = ack.ack_ranges.max();
                let newly = tracker.reconcile(space, ack.ack_ranges.expanded());
                let eliciting = sent.any_ack_eliciting(space, &newly);
                let time = match sent.get(space, max) {
                    Some(info) => info.time.clone(),
                    None => {
                        summary.lookup_misses += 1;
                        debug!(index, space = %space, max, "最大被确认 packet 没有发送记录");
                        Value::Null
                    }
                };
                debug!(
                    index,
                    space = %space,
                    max,
                    newly = newly.len(),
                    eliciting,
                    "标注 ACK 事件"
                );
                (time, eliciting)
            }
        };

        event.set_field(schema.max_ack_sent_time_field, max_ack_sent_time);
        event.set_field(schema.newly_acked_eliciting_field, Value::Bool(eliciting));
        summary.annotated += 1;
        if eliciting {
            summary.newly_acked_eliciting += 1;
        }
    }

    info!(%summary, "标注完成");
    summary
}

/// 读取 `input`，标注后写到 `output`
///
/// 任何致命错误都发生在写出之前；`output` 要么是完整的标注结果，要么保持不变。
#[tracing::instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
pub fn annotate_file(
    input: &Path,
    output: &Path,
    schema: &QlogSchema,
) -> Result<AnnotationSummary, AnnotateError> {
    let mut trace = load_trace(input, schema)?;
    let summary = annotate(&mut trace, schema);
    write_trace(output, &trace)?;
    info!("已写出标注后的 trace");
    Ok(summary)
}

pub fn load_trace(path: &Path, schema: &QlogSchema) -> Result<Trace, AnnotateError> {
    let raw = fs::read(path).map_err(|source| AnnotateError::Io {
        op: "read",
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_slice(&raw)?;
    Trace::from_value(value, schema)
}

/// 先写同目录临时文件再 rename，避免留下半个输出
pub fn write_trace(path: &Path, trace: &Trace) -> Result<(), AnnotateError> {
    let tmp = temp_path(path);
    let result = write_compact(&tmp, trace).and_then(|()| {
        fs::rename(&tmp, path).map_err(|source| AnnotateError::Io {
            op: "rename",
            path: path.to_path_buf(),
            source,
        })
    });
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn write_compact(path: &Path, trace: &Trace) -> Result<(), AnnotateError> {
    let io_err = |source| AnnotateError::Io {
        op: "write",
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, trace)?;
    writer.flush().map_err(io_err)?;
    writer
        .into_inner()
        .map_err(|e| io_err(e.into_error()))?
        .sync_all()
        .map_err(io_err)
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "trace.json".to_string());
    path.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}
