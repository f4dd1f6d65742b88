//! PTO 诊断标注
//!
//! 读取扁平化 qlog trace，为每个接收 ACK 事件补充最大被确认 packet 的发送时间
//! 以及新确认 packet 是否含 ack-eliciting frame，然后写出完整 trace。

use clap::Parser;
use pto_annotate::{annotate_file, QlogSchema};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

#[derive(Debug, Parser)]
#[command(
    name = "pto_annotate",
    about = "为 qlog trace 中的 ACK 事件补充 PTO 诊断字段"
)]
struct Args {
    /// 输入 trace（JSON 事件数组）
    #[arg(short, long)]
    input: PathBuf,
    /// 输出路径；失败时不会写出
    #[arg(short, long)]
    output: PathBuf,
}

fn main() -> ExitCode {
    // 初始化 tracing（写到 stderr，stdout 只留统计行）
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();

    match annotate_file(&args.input, &args.output, &QlogSchema::QLOG) {
        Ok(summary) => {
            println!("done: {summary}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(%err, "标注失败，未写出结果");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
