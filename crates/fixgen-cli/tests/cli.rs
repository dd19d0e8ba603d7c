use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::json;

fn temp_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("fixgen-cli-{label}-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn write_config(dir: &Path) -> PathBuf {
    let config = json!({
        "package": "com.example.shop",
        "classes": [
            {
                "name": "Widget",
                "caption": "Widget",
                "fields": [
                    {"name": "id", "type": "String"},
                    {"name": "name", "type": "String", "notBlank": true},
                    {"name": "price", "type": "double", "min": 0, "max": 1000}
                ]
            }
        ]
    });
    let path = dir.join("shop.schema.json");
    std::fs::write(&path, serde_json::to_vec_pretty(&config).expect("encode")).expect("write");
    path
}

fn fixgen() -> Command {
    Command::new(env!("CARGO_BIN_EXE_fixgen"))
}

#[test]
fn generates_fixtures_into_existing_directory() {
    let dir = temp_dir("ok");
    let config = write_config(&dir);
    let out = dir.join("out");
    std::fs::create_dir_all(&out).expect("create out");
    let log_file = dir.join("logs").join("fixgen.jsonl");

    let output = fixgen()
        .arg(&config)
        .arg(&out)
        .args(["--rows", "3", "--seed", "9", "--anchor", "2024-01-01T00:00:00Z"])
        .arg("--log-file")
        .arg(&log_file)
        .output()
        .expect("run fixgen");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Widget: 3 rows"), "stdout: {stdout}");

    let index = std::fs::read_to_string(out.join("widget/index.csv")).expect("index.csv");
    assert_eq!(index.lines().count(), 4);
    assert!(index.starts_with("payload,id,name,price\n"));
    assert!(out.join("generation_report.json").is_file());

    let logs = std::fs::read_to_string(&log_file).expect("log file");
    assert!(logs.contains("generation completed"));

    std::fs::remove_dir_all(&dir).expect("cleanup");
}

#[test]
fn missing_output_directory_is_rejected() {
    let dir = temp_dir("no-out");
    let config = write_config(&dir);

    let output = fixgen()
        .arg(&config)
        .arg(dir.join("missing"))
        .output()
        .expect("run fixgen");

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("output directory does not exist"));

    std::fs::remove_dir_all(&dir).expect("cleanup");
}

#[test]
fn missing_config_file_is_rejected() {
    let dir = temp_dir("no-config");

    let output = fixgen()
        .arg(dir.join("absent.json"))
        .arg(&dir)
        .output()
        .expect("run fixgen");

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("config file not found"));

    std::fs::remove_dir_all(&dir).expect("cleanup");
}

#[test]
fn missing_arguments_print_usage() {
    let output = fixgen().output().expect("run fixgen");

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
}
