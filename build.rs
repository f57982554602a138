use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=RUSTC");

    let rustc = env::var("RUSTC").unwrap_or_else(|_| String::from("rustc"));
    let version = Command::new(&rustc)
        .arg("--version")
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .and_then(|s| parse_release(&s))
        .unwrap_or_else(|| String::from("unknown"));

    println!("cargo:rustc-env=STATUSBOARD_RUSTC_VERSION={version}");
}

// "rustc 1.80.1 (3f5fd8dd4 2024-08-06)" -> "1.80.1"
fn parse_release(raw: &str) -> Option<String> {
    raw.split_whitespace().nth(1).map(str::to_string)
}
