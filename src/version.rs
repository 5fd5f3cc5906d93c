//! Build version reported by `tagd`, `tagctl` and the HTTP API.

/// Crate version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git branch at build time, or "unknown" outside a checkout.
pub const GIT_BRANCH: &str = match option_env!("VERGEN_GIT_BRANCH") {
    Some(branch) => branch,
    None => "unknown",
};

/// Short git SHA at build time, or "unknown" outside a checkout.
pub const GIT_SHA: &str = match option_env!("VERGEN_GIT_SHA") {
    Some(sha) => sha,
    None => "unknown",
};

pub fn git_dirty() -> bool {
    option_env!("VERGEN_GIT_DIRTY") == Some("true")
}

/// `{version}+{branch}.{sha}`, with a `.dirty` suffix for modified trees.
///
/// e.g. `0.1.0+main.abc1234` or `0.1.0+main.abc1234.dirty`
pub fn version_string() -> String {
    let sha = &GIT_SHA[..7.min(GIT_SHA.len())];
    let mut version = format!("{PKG_VERSION}+{GIT_BRANCH}.{sha}");
    if git_dirty() {
        version.push_str(".dirty");
    }
    version
}

/// `User-Agent` sent by the HTTP clients in this crate.
pub fn user_agent() -> String {
    format!("tag-classifier/{PKG_VERSION}")
}
