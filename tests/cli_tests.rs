use std::path::PathBuf;
use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ticket-replay"))
        .args(args)
        .output()
        .expect("Unable to run ticket-replay")
}

fn script_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "ticket-replay-{}-{}.csv",
        std::process::id(),
        name
    ));
    std::fs::write(&path, contents).expect("Unable to write script");
    path
}

#[test]
fn summary_goes_to_stdout() {
    let path = script_file("summary", "type,amount\ninsert,80\nprint\ninsert,20\n");
    let output = run(&["50", path.to_str().unwrap()]);
    std::fs::remove_file(&path).ok();

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(output.stdout, b"price,balance,total\n50,50,50\n");
}

#[test]
fn wrong_argument_count_exits_with_error() {
    for args in [&[][..], &["50"][..], &["50", "a.csv", "extra"][..]] {
        let output = run(args);
        assert_eq!(output.status.code(), Some(1));
        assert!(output.stdout.is_empty());
    }
}

#[test]
fn invalid_price_exits_with_error() {
    let path = script_file("price", "type,amount\ninsert,10\n");
    for price in ["fifty", "0", "-10"] {
        let output = run(&[price, path.to_str().unwrap()]);
        assert_eq!(output.status.code(), Some(1));
        assert!(output.stdout.is_empty());
    }
    std::fs::remove_file(&path).ok();
}

#[test]
fn missing_file_exits_with_error() {
    let path = std::env::temp_dir().join(format!(
        "ticket-replay-{}-does-not-exist.csv",
        std::process::id()
    ));
    let output = run(&["50", path.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}
