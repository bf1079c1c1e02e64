//! `tk migrate`: run any pending document migrations explicitly.
//!
//! Migrations also run automatically before every data command; this
//! command exists to run them deliberately and report what happened.

use std::io::Write;
use std::path::Path;

use clap::Args;
use serde::Serialize;

use tickets_core::{MigrationManager, MigrationOutcome};

use crate::cmd::fail;
use crate::output::{OutputMode, render};

#[derive(Args, Debug, Default)]
pub struct MigrateArgs {}

#[derive(Debug, Serialize)]
struct MigrateReport {
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    steps: Option<usize>,
}

pub fn run_migrate(_args: &MigrateArgs, path: &Path, output: OutputMode) -> anyhow::Result<()> {
    match MigrationManager::new().ensure_current(path) {
        Ok(outcome) => {
            let report = match outcome {
                MigrationOutcome::NoDocument => MigrateReport {
                    outcome: "no-document",
                    from: None,
                    steps: None,
                },
                MigrationOutcome::AlreadyCurrent => MigrateReport {
                    outcome: "already-current",
                    from: None,
                    steps: None,
                },
                MigrationOutcome::Migrated { from, steps } => MigrateReport {
                    outcome: "migrated",
                    from: Some(from),
                    steps: Some(steps),
                },
            };
            render(output, &report, |r, w| match (&r.from, r.steps) {
                (Some(from), Some(steps)) => {
                    writeln!(w, "migrated from {from} in {steps} step(s)")
                }
                _ => writeln!(w, "{}", r.outcome),
            })
        }
        Err(err) => fail(output, &err),
    }
}
