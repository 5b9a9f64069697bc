// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// One module per subcommand. Each returns whether it succeeded; errors that
// stop a command before it has a result propagate to `main`.

pub mod export;
pub mod extract;
pub mod languages;
pub mod paste;

mod output;

use textgrab_core::AppConfig;

use crate::services::engine::EngineStatus;

/// What the recognition commands share.
pub struct Context {
    pub config: AppConfig,
    pub engine: EngineStatus,
}
