//! 生成一次三次握手（可选附带数据段）并按行输出每个报文的字节

use clap::Parser;
use enforcer_fixtures::packetgen::{Packet, PacketFlow};
use tracing::{debug, error, info};

#[derive(Debug, Parser)]
#[command(
    name = "handshake",
    about = "Generate a synthetic TCP handshake and print packet bytes"
)]
struct Args {
    #[arg(long, default_value = "10.0.0.1")]
    src: String,
    #[arg(long, default_value = "10.0.0.2")]
    dst: String,
    #[arg(long, default_value_t = 40000)]
    sport: u16,
    #[arg(long, default_value_t = 80)]
    dport: u16,
    /// 追加一个携带该载荷的 PSH-ACK 数据段
    #[arg(long)]
    payload: Option<String>,
    /// 同时输出解析后的头部字段
    #[arg(long)]
    decode: bool,
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn describe(pkt: &Packet) -> String {
    let (Some(ip), Some(tcp)) = (pkt.ip_layer(), pkt.tcp_layer()) else {
        return "incomplete".to_string();
    };
    let addr =
        |a: Option<std::net::IpAddr>| a.map_or_else(|| "-".to_string(), |a| a.to_string());
    format!(
        "{}:{} -> {}:{} seq={} ack={} win={} ttl={} ip_csum={:#06x} tcp_csum={:#06x}",
        addr(ip.src),
        tcp.src_port,
        addr(ip.dst),
        tcp.dst_port,
        tcp.sequence,
        tcp.acknowledgment,
        tcp.window,
        ip.ttl,
        ip.checksum,
        tcp.checksum,
    )
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
    let mut flow = PacketFlow::new(args.src.clone(), args.dst.clone(), args.sport, args.dport);

    let generated = match &args.payload {
        Some(p) => flow
            .generate_handshake_with_payload(p.as_bytes())
            .map(|pkts| pkts.len()),
        None => flow.generate_handshake().map(|pkts| pkts.len()),
    };
    if let Err(e) = generated {
        error!(error = %e, "failed to build flow");
        std::process::exit(1);
    }
    info!(packets = flow.len(), src = %args.src, dst = %args.dst, "flow generated");

    let all = match flow.to_bytes() {
        Ok(all) => all,
        Err(e) => {
            error!(error = %e, "failed to serialize flow");
            std::process::exit(1);
        }
    };

    for (i, bytes) in all.iter().enumerate() {
        let flags = flow
            .nth_packet(i)
            .and_then(Packet::flags)
            .map(|f| f.label())
            .unwrap_or_default();
        println!("pkt {i} flags={flags} len={} hex={}", bytes.len(), hex(bytes));
        if args.decode {
            match Packet::parse(bytes) {
                Ok(parsed) => println!("    {}", describe(&parsed)),
                Err(e) => debug!(error = %e, idx = i, "decode failed"),
            }
        }
    }
}
