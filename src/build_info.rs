//! What this binary is: package version, how it was compiled, and the catalog
//! schema it expects.

use serde::Serialize;

use crate::db::migrations::SCHEMA_VERSION;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// UTC compile time, ISO 8601
pub const BUILD_TIMESTAMP: &str = match option_env!("EPICOURIER_BUILD_TIMESTAMP") {
    Some(s) => s,
    None => "unknown",
};

/// Cargo profile, `debug` or `release`
pub const BUILD_PROFILE: &str = match option_env!("EPICOURIER_BUILD_PROFILE") {
    Some(s) => s,
    None => "unknown",
};

pub const BUILD_TARGET: &str = match option_env!("EPICOURIER_BUILD_TARGET") {
    Some(s) => s,
    None => "unknown",
};

#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub build_timestamp: &'static str,
    pub build_profile: &'static str,
    pub build_target: &'static str,
    /// Schema version `Database::open` migrates to
    pub schema_version: i32,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            name: NAME,
            version: VERSION,
            build_timestamp: BUILD_TIMESTAMP,
            build_profile: BUILD_PROFILE,
            build_target: BUILD_TARGET,
            schema_version: SCHEMA_VERSION,
        }
    }

    /// `0.2.0 (release, x86_64-unknown-linux-gnu)`
    pub fn version_line(&self) -> String {
        format!("{} ({}, {})", self.version, self.build_profile, self.build_target)
    }
}

/// Print the startup banner to stderr (stdout belongs to the MCP transport)
pub fn print_startup_banner() {
    let info = BuildInfo::current();
    eprintln!("===============================================");
    eprintln!("  EpiCourier Meal Planner {}", info.version_line());
    eprintln!("  Catalog schema: v{}", info.schema_version);
    eprintln!("  Compiled: {}", info.build_timestamp);
    eprintln!("===============================================");
}
