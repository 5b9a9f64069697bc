// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer: what the commands need from the environment (config file
// location, the Tesseract engine, the clipboard).

pub mod clipboard;
pub mod config_dir;
pub mod engine;
