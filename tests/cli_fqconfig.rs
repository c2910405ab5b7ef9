use serde_json::Value;
use std::process::Command;

fn run_fqconfig(args: &[&str]) -> Value {
    let output = Command::new(env!("CARGO_BIN_EXE_fqconfig"))
        .args(args)
        .output()
        .expect("run fqconfig");
    assert!(
        output.status.success(),
        "fqconfig failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim()).expect("stdout must be JSON")
}

#[test]
fn fqconfig_defaults_print_separated_ranges() {
    let v = run_fqconfig(&[]);
    assert_eq!(v["queue_separation"], true);
    assert_eq!(v["mark_value"], 0x1111);
    assert_eq!(v["application_queue_syn"], "0:3");
    assert_eq!(v["application_queue_ack"], "4:7");
    assert_eq!(v["application_queue_svc"], "8:11");
    assert_eq!(v["network_queue_syn"], "12:15");
    assert_eq!(v["network_queue_ack"], "16:19");
    assert_eq!(v["network_queue_svc"], "20:23");
    assert_eq!(v["num_application_queues"], 12);
    assert_eq!(v["num_network_queues"], 12);
    assert_eq!(v["network_queue_size"], 500);
}

#[test]
fn fqconfig_no_separation_aliases_ranges() {
    let v = run_fqconfig(&["--no-separation", "--queue-start", "100", "--network-queues", "2"]);
    assert_eq!(v["queue_separation"], false);
    assert_eq!(v["application_queue_syn"], "100:103");
    assert_eq!(v["application_queue_svc"], "100:103");
    assert_eq!(v["network_queue_syn"], "104:105");
    assert_eq!(v["network_queue_ack"], "104:105");
    assert_eq!(v["network_queue_start"], 104);
}

#[test]
fn fqconfig_params_json_overrides_flags() {
    let v = run_fqconfig(&[
        "--mark",
        "1",
        "--params",
        r#"{ "mark_value": 4660, "application_queues": 1, "network_queues": 1 }"#,
    ]);
    assert_eq!(v["mark_value"], 4660);
    assert_eq!(v["application_queue_syn"], "0:0");
    assert_eq!(v["network_queue_svc"], "5:5");
}

#[test]
fn fqconfig_rejects_malformed_params() {
    let output = Command::new(env!("CARGO_BIN_EXE_fqconfig"))
        .args(["--params", "{ not json"])
        .output()
        .expect("run fqconfig");
    assert!(!output.status.success());
}
