//! Command implementations.

use std::io::Write;

use anyhow::Context;
use caseflow_authz::{Actor, Identifier, Policy, PolicyError};
use serde_json::Value;
use tracing::{debug, warn};

use crate::cli::{CheckArgs, CommandContext, ExplainArgs, MatrixArgs};
use crate::error::CliError;
use crate::output::{write_output, CheckReport, ExplainReport, MatrixReport, MatrixRow};

/// Validate a policy and report every problem found.
pub fn check(ctx: &CommandContext, args: CheckArgs, out: &mut impl Write) -> Result<(), CliError> {
    let path = args.file.or_else(|| ctx.policy_path.clone());
    let source = path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "built-in policy".to_string());

    let loaded = match &path {
        Some(path) => Policy::load(path).map_err(CliError::from),
        None => ctx.load_policy(),
    };

    match loaded {
        Ok(policy) => {
            let report = CheckReport {
                source,
                valid: true,
                roles: policy.roles().len(),
                resources: policy.resources().count(),
                actions: policy.actions().count(),
                cells: policy.entries().count(),
                problems: Vec::new(),
            };
            write_output(ctx, &report, out)
        }
        Err(CliError::Policy(PolicyError::Invalid { violations })) => {
            let report = CheckReport {
                source,
                valid: false,
                roles: 0,
                resources: 0,
                actions: 0,
                cells: 0,
                problems: violations.iter().map(ToString::to_string).collect(),
            };
            write_output(ctx, &report, out)?;
            Err(CliError::InvalidPolicy {
                problems: violations.len(),
            })
        }
        Err(e) => Err(e),
    }
}

/// Show what the engine decides for one request.
pub fn explain(
    ctx: &CommandContext,
    args: ExplainArgs,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let policy = ctx.load_policy()?;

    if !policy.hierarchy().contains(&args.role) {
        warn!(role = %args.role, "role is not declared; every request will be denied");
    }
    if !policy.declares_resource(&args.resource) {
        warn!(resource = %args.resource, "resource is not declared");
    }
    if !policy.declares_action(&args.action) {
        warn!(action = %args.action, "action is not declared");
    }

    let target = args
        .target
        .as_deref()
        .map(parse_target)
        .transpose()?;

    let actor = Actor::new(Identifier::from(args.actor_id.clone()), args.role.as_str());
    let decision = policy.authorize(&actor, &args.resource, &args.action, target.as_ref());
    let filter = policy.generate_filter(&actor, &args.resource, &args.action);
    debug!(?decision, %filter, "explained request");

    let report = ExplainReport {
        role: args.role,
        resource: args.resource,
        action: args.action,
        actor_id: args.actor_id,
        restriction: decision.restriction,
        allowed: decision.allowed,
        code: decision.code,
        filter,
    };
    write_output(ctx, &report, out)
}

fn parse_target(raw: &str) -> Result<Value, CliError> {
    serde_json::from_str(raw)
        .context("expected a JSON document")
        .map_err(|e| CliError::InvalidArgument {
            argument: "--target".to_string(),
            message: format!("{e:#}"),
        })
}

/// Print declared matrix cells, most junior role first.
pub fn matrix(ctx: &CommandContext, args: MatrixArgs, out: &mut impl Write) -> Result<(), CliError> {
    let policy = ctx.load_policy()?;

    if let Some(role) = &args.role {
        if !policy.hierarchy().contains(role) {
            return Err(CliError::InvalidArgument {
                argument: "--role".to_string(),
                message: format!("`{role}` is not a declared role"),
            });
        }
    }

    let rows = policy
        .roles()
        .iter()
        .filter(|role| args.role.as_deref().map_or(true, |r| r == role.as_str()))
        .flat_map(|role| {
            policy
                .entries()
                .filter(move |entry| entry.role == role)
                .map(|entry| MatrixRow {
                    role: entry.role.to_string(),
                    resource: entry.resource.to_string(),
                    action: entry.action.to_string(),
                    restriction: entry.restriction,
                })
        })
        .collect();

    write_output(ctx, &MatrixReport { rows }, out)
}
