//! Build script for EpiCourier
//!
//! Stamps the binary with when and how it was compiled, so `epicourier_status`
//! can tell a planner which server build answered.

use std::env;

fn main() {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed=Cargo.toml");

    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    let target = env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=EPICOURIER_BUILD_TIMESTAMP={}", timestamp);
    println!("cargo:rustc-env=EPICOURIER_BUILD_PROFILE={}", profile);
    println!("cargo:rustc-env=EPICOURIER_BUILD_TARGET={}", target);
}
