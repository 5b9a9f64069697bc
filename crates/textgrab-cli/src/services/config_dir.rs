// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware config file resolution.

use std::path::{Path, PathBuf};

use textgrab_core::AppConfig;
use textgrab_core::error::Result;
use tracing::debug;

/// Where the config file lives: the explicit path if given, otherwise
/// `textgrab/config.toml` under the XDG config directory.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => config_base(
            std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
            std::env::var_os("HOME").map(PathBuf::from),
        )
        .join("textgrab")
        .join("config.toml"),
    }
}

/// Load the config, using defaults when the file does not exist.
pub fn load(explicit: Option<&Path>) -> Result<AppConfig> {
    let path = config_path(explicit);
    debug!(path = %path.display(), "Loading config");
    AppConfig::load(&path)
}

/// `$XDG_CONFIG_HOME`, else `$HOME/.config`, else the working directory.
fn config_base(xdg: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    if let Some(xdg) = xdg.filter(|p| !p.as_os_str().is_empty()) {
        return xdg;
    }
    if let Some(home) = home {
        return home.join(".config");
    }
    PathBuf::from(".")
}
