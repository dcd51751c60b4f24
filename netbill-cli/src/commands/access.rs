use anyhow::{Result, bail};
use clap::Subcommand;
use shared::access::GuardDecision;

use crate::context::AppContext;

#[derive(Subcommand, Debug)]
pub enum AccessCommand {
    /// Evaluate the stored session against a permission, as the web guard would
    Check {
        /// Permission name such as `view_invoices`; omit to only require a session
        permission: Option<String>,
    },
}

pub fn run(context: &AppContext, command: AccessCommand) -> Result<()> {
    match command {
        AccessCommand::Check { permission } => {
            let session = context.store.try_snapshot()?;
            let decision = context.guard.evaluate(&session, permission.as_deref());
            report(decision)
        }
    }
}

fn report(decision: GuardDecision) -> Result<()> {
    match decision.redirect_path() {
        None => {
            println!("allowed");
            Ok(())
        }
        Some(path) => bail!("denied: redirect to {path}"),
    }
}
