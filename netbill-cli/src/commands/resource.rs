use anyhow::{Result, anyhow, bail};
use clap::Subcommand;
use serde_json::Value;
use shared::api::Resource;

use crate::context::AppContext;

#[derive(Subcommand, Debug)]
pub enum ResourceCommand {
    /// List every record of a resource
    List {
        #[arg(value_parser = parse_resource)]
        resource: Resource,
    },
    /// Show one record
    Get {
        #[arg(value_parser = parse_resource)]
        resource: Resource,
        id: String,
    },
    /// Mark a payment as verified
    VerifyPayment { id: String },
}

/// Accepts `audit_logs`, `audit-logs` and any casing.
pub fn parse_resource(value: &str) -> Result<Resource, String> {
    value
        .trim()
        .to_lowercase()
        .replace('-', "_")
        .parse::<Resource>()
        .map_err(|_| format!("unknown resource `{value}`"))
}

pub async fn run(context: &AppContext, command: ResourceCommand) -> Result<()> {
    let (resource, permission) = match &command {
        ResourceCommand::List { resource } | ResourceCommand::Get { resource, .. } => {
            (*resource, resource.view_permission())
        }
        ResourceCommand::VerifyPayment { .. } => {
            (Resource::Payments, Resource::Payments.manage_permission())
        }
    };
    let session = context.store.try_snapshot()?;
    if let Some(path) = context.guard.evaluate(&session, Some(&permission)).redirect_path() {
        bail!("{permission} is required to access {resource} (redirect to {path})");
    }

    let client = context.client()?;
    let output = match command {
        ResourceCommand::List { resource } => {
            let rows = client.list(resource).await.map_err(|err| anyhow!(err.user_message()))?;
            tracing::debug!(%resource, count = rows.len(), "listed records");
            Value::Array(rows)
        }
        ResourceCommand::Get { resource, id } => client
            .fetch(resource, &id)
            .await
            .map_err(|err| anyhow!(err.user_message()))?,
        ResourceCommand::VerifyPayment { id } => client
            .verify_payment(&id)
            .await
            .map_err(|err| anyhow!(err.user_message()))?,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
