//! Build information.
//!
//! `GIT_COMMIT` and `BUILD_DATE` are read from the build environment when
//! present, e.g. `GIT_COMMIT=$(git rev-parse --short HEAD) cargo build`.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub version: &'static str,
    pub git_commit: &'static str,
    pub build_date: &'static str,
}

pub const fn current() -> VersionInfo {
    VersionInfo {
        version: env!("CARGO_PKG_VERSION"),
        git_commit: match option_env!("GIT_COMMIT") {
            Some(commit) => commit,
            None => "unknown",
        },
        build_date: match option_env!("BUILD_DATE") {
            Some(date) => date,
            None => "unknown",
        },
    }
}
