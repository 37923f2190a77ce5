use std::{
    io::Write,
    process::{Command, Output, Stdio},
};

use rstest::rstest;

fn run_with_stdin(bin: &str, input: &str) -> Output {
    let mut child = Command::new(bin)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();

    child.wait_with_output().unwrap()
}

#[test]
fn sum_small_prints_total() {
    let input = "$ cd a
$ ls
100 f1
$ cd ..
$ cd b
$ ls
200000 f2
$ cd ..
";
    let out = run_with_stdin(env!("CARGO_BIN_EXE_sum_small"), input);

    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout).unwrap(), "100\n");
}

#[rstest]
#[case("abc def\n", "abc def")]
#[case("$ cd a\n123\n$ cd ..\n", "123")]
#[case("18446744073709551615 a\n1 b\n", "overflows")]
fn sum_small_reports_error_on_stdout(#[case] input: &str, #[case] mentions: &str) {
    let out = run_with_stdin(env!("CARGO_BIN_EXE_sum_small"), input);

    assert_eq!(out.status.code(), Some(1));

    let stdout = String::from_utf8(out.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.starts_with("Error: dir size: "));
    assert!(stdout.contains(mentions));
}

#[test]
fn sum_small_malformed_report_is_plain_when_piped() {
    let out = run_with_stdin(env!("CARGO_BIN_EXE_sum_small"), "abc def\n");

    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("abc def"));
    assert!(!stderr.contains('\x1b'));
}

#[test]
fn free_space_prints_smallest_dir() {
    let out = run_with_stdin(
        env!("CARGO_BIN_EXE_free_space"),
        include_str!("../data/test_input"),
    );

    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout).unwrap(), "24933642\n");
}

#[test]
fn free_space_reports_error_on_stdout() {
    let out = run_with_stdin(env!("CARGO_BIN_EXE_free_space"), "1 small\n");

    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.starts_with("Error: size to delete: "));
}
