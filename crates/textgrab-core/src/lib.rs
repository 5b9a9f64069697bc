// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// textgrab: Core types, settings, reports, and error definitions shared
// across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod report;
pub mod types;

pub use config::AppConfig;
pub use error::TextgrabError;
pub use report::Outcome;
pub use types::*;
