//! 打印 NFQUEUE 队列配置（JSON），供规则生成方读取

use clap::Parser;
use enforcer_fixtures::fqconfig::{
    DEFAULT_MARK_VALUE, DEFAULT_NUMBER_OF_QUEUES, DEFAULT_QUEUE_SIZE, DEFAULT_QUEUE_START,
    QueueConfigParams,
};
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(
    name = "fqconfig",
    about = "Compute NFQUEUE queue ranges and print them as JSON"
)]
struct Args {
    /// 关闭 syn/ack/svc 分队列
    #[arg(long)]
    no_separation: bool,
    #[arg(long, default_value_t = DEFAULT_MARK_VALUE)]
    mark: u32,
    #[arg(long, default_value_t = DEFAULT_QUEUE_START)]
    queue_start: u16,
    /// 每类 network 队列数
    #[arg(long, default_value_t = DEFAULT_NUMBER_OF_QUEUES)]
    network_queues: u16,
    /// 每类 application 队列数
    #[arg(long, default_value_t = DEFAULT_NUMBER_OF_QUEUES)]
    application_queues: u16,
    #[arg(long, default_value_t = DEFAULT_QUEUE_SIZE)]
    network_queue_size: u32,
    #[arg(long, default_value_t = DEFAULT_QUEUE_SIZE)]
    application_queue_size: u32,
    /// Inline JSON parameter object; overrides all other flags
    #[arg(long)]
    params: Option<String>,
    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() {
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

    let params = match &args.params {
        Some(raw) => match serde_json::from_str::<QueueConfigParams>(raw) {
            Ok(p) => p,
            Err(e) => {
                error!(error = %e, "invalid --params");
                std::process::exit(2);
            }
        },
        None => QueueConfigParams {
            queue_separation: !args.no_separation,
            mark_value: args.mark,
            queue_start: args.queue_start,
            network_queues: args.network_queues,
            application_queues: args.application_queues,
            network_queue_size: args.network_queue_size,
            application_queue_size: args.application_queue_size,
        },
    };
    info!(?params, "building queue config");

    let cfg = params.build();
    let out = if args.pretty {
        serde_json::to_string_pretty(&cfg)
    } else {
        serde_json::to_string(&cfg)
    };
    match out {
        Ok(s) => println!("{s}"),
        Err(e) => {
            error!(error = %e, "failed to serialize config");
            std::process::exit(1);
        }
    }
}
