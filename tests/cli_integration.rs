//! Purpose: End-to-end coverage of the `ujsonize` binary over stdin and stdout.
//! Exports: Integration tests only.
//! Role: Verify output lines, exit codes, and stderr envelopes for both directions.
//! Invariants: Whole-input failures exit non-zero with nothing on stdout.
//! Invariants: By-line runs skip failed lines and still exit 0.
use std::io::Write;
use std::process::{Command, Output, Stdio};

use serde_json::Value;

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_ujsonize");
    Command::new(exe)
}

fn run_with_stdin(args: &[&str], stdin: &str) -> Output {
    let mut child = cmd()
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(stdin.as_bytes())
        .expect("write stdin");
    child.wait_with_output().expect("wait")
}

fn stdout_text(output: &Output) -> &str {
    std::str::from_utf8(&output.stdout).expect("utf8")
}

fn parse_json(value: &str) -> Value {
    serde_json::from_str(value).expect("valid json")
}

#[test]
fn encode_whole_input() {
    let output = run_with_stdin(&["encode"], "  a=1&a=2&b=hello+world\n");
    assert!(output.status.success());
    assert_eq!(
        stdout_text(&output),
        "{\"a\":[\"1\",\"2\"],\"b\":[\"hello world\"]}\n"
    );
}

#[test]
fn decode_whole_input() {
    let output = run_with_stdin(
        &["decode"],
        r#"{"hoge":["fuga","piyo"],"foo":["bar","baz","qux"]}"#,
    );
    assert!(output.status.success());
    assert_eq!(
        stdout_text(&output),
        "foo=bar&foo=baz&foo=qux&hoge=fuga&hoge=piyo\n"
    );
}

#[test]
fn encode_output_decodes_back() {
    let encoded = run_with_stdin(&["encode"], "x=1&y=2&x=3");
    assert!(encoded.status.success());
    let decoded = run_with_stdin(&["decode"], stdout_text(&encoded));
    assert!(decoded.status.success());
    assert_eq!(stdout_text(&decoded), "x=1&x=3&y=2\n");
}

#[test]
fn whole_input_parse_error_is_fatal() {
    let output = run_with_stdin(&["decode"], "[1,2,3]");
    assert_eq!(output.status.code().unwrap(), 3);
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    let envelope = parse_json(stderr.lines().last().expect("error line"));
    assert_eq!(envelope["error"]["kind"], "Parse");
    assert!(
        envelope["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("failed to decode:")
    );
}

#[test]
fn malformed_escape_is_fatal() {
    let output = run_with_stdin(&["encode"], "a=%zz");
    assert_eq!(output.status.code().unwrap(), 3);
    assert!(output.stdout.is_empty());
}

#[test]
fn byline_skips_bad_lines_and_continues() {
    let output = run_with_stdin(
        &["decode", "--byline"],
        "{\"a\":[\"1\"]}\nnot json\n  {\"b\":true}  \n",
    );
    assert!(output.status.success());
    assert_eq!(stdout_text(&output), "a=1\nb=true\n");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to decode"));
}

#[test]
fn by_line_alias_encodes_each_line() {
    let output = run_with_stdin(&["encode", "--by-line"], "a=1\nb=%zz\nc=3\n");
    assert!(output.status.success());
    assert_eq!(stdout_text(&output), "{\"a\":[\"1\"]}\n{\"c\":[\"3\"]}\n");
}

#[test]
fn no_trim_keeps_whitespace_in_keys() {
    let output = run_with_stdin(&["encode", "--no-trim"], " a=1");
    assert!(output.status.success());
    assert_eq!(stdout_text(&output), "{\" a\":[\"1\"]}\n");
}

#[test]
fn decode_escapes_reserved_characters_for_round_trip() {
    let encoded = run_with_stdin(&["encode"], "a=%26b&a=100%25&k%3Dx=x%3By");
    assert!(encoded.status.success());
    let decoded = run_with_stdin(&["decode"], stdout_text(&encoded));
    assert!(decoded.status.success());
    assert_eq!(stdout_text(&decoded), "a=%26b&a=100%25&k%3Dx=x%3By\n");
}

#[test]
fn invalid_log_level_is_usage_error() {
    let output = cmd()
        .args(["--log-level", "ujsonize=loud", "encode"])
        .output()
        .expect("run");
    assert_eq!(output.status.code().unwrap(), 2);
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    let envelope = parse_json(stderr.lines().last().expect("error line"));
    assert_eq!(envelope["error"]["kind"], "Usage");
}

#[test]
fn missing_subcommand_prints_usage() {
    let output = cmd().output().expect("run");
    assert_eq!(output.status.code().unwrap(), 2);
    let rendered = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(rendered.contains("encode"));
    assert!(rendered.contains("decode"));
}

#[test]
fn unknown_subcommand_is_usage_error() {
    let output = cmd().arg("explode").output().expect("run");
    assert_eq!(output.status.code().unwrap(), 2);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let envelope = parse_json(stderr.lines().last().expect("error line"));
    assert_eq!(envelope["error"]["kind"], "Usage");
    assert!(envelope["error"]["hint"].as_str().unwrap().contains("--help"));
}
