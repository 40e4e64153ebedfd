//! Output formatting for CLI commands.

use std::io::Write;

use anyhow::Context;
use caseflow_authz::{QueryFilter, ReasonCode, Restriction};
use serde::Serialize;

use crate::cli::{CommandContext, OutputFormat};
use crate::error::CliError;

/// Trait for types that can be formatted for output
pub trait FormattedOutput {
    fn format_text(&self) -> String;
    fn format_json(&self) -> Result<String, serde_json::Error>;
}

/// Write `value` in the context's format
pub fn write_output<T, W>(ctx: &CommandContext, value: &T, writer: &mut W) -> Result<(), CliError>
where
    T: FormattedOutput + Serialize,
    W: Write + ?Sized,
{
    let output = match ctx.format {
        OutputFormat::Text => value.format_text(),
        OutputFormat::Json => value.format_json().context("JSON serialization failed")?,
    };

    writeln!(writer, "{output}")?;
    Ok(())
}

/// Result of `check`
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub source: String,
    pub valid: bool,
    pub roles: usize,
    pub resources: usize,
    pub actions: usize,
    pub cells: usize,
    pub problems: Vec<String>,
}

impl FormattedOutput for CheckReport {
    fn format_text(&self) -> String {
        if self.valid {
            format!(
                "{}: ok ({} roles, {} resources, {} actions, {} declared cells)",
                self.source, self.roles, self.resources, self.actions, self.cells
            )
        } else {
            let mut text = format!("{}: {} problem(s)", self.source, self.problems.len());
            for problem in &self.problems {
                text.push_str("\n  - ");
                text.push_str(problem);
            }
            text
        }
    }

    fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Result of `explain`
#[derive(Debug, Serialize)]
pub struct ExplainReport {
    pub role: String,
    pub resource: String,
    pub action: String,
    pub actor_id: String,
    pub restriction: Restriction,
    pub allowed: bool,
    pub code: ReasonCode,
    pub filter: QueryFilter,
}

impl FormattedOutput for ExplainReport {
    fn format_text(&self) -> String {
        let verdict = if self.allowed { "allowed" } else { "denied" };
        format!(
            "{role} {action} {resource} (actor {actor})\n  restriction: {restriction}\n  decision:    {verdict} ({code})\n  filter:      {filter}",
            role = self.role,
            action = self.action,
            resource = self.resource,
            actor = self.actor_id,
            restriction = self.restriction,
            code = self.code,
            filter = self.filter,
        )
    }

    fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// One row of `matrix`
#[derive(Debug, Serialize)]
pub struct MatrixRow {
    pub role: String,
    pub resource: String,
    pub action: String,
    pub restriction: Restriction,
}

/// Result of `matrix`
#[derive(Debug, Serialize)]
pub struct MatrixReport {
    pub rows: Vec<MatrixRow>,
}

impl FormattedOutput for MatrixReport {
    fn format_text(&self) -> String {
        let role_w = column_width(self.rows.iter().map(|r| r.role.as_str()), "ROLE");
        let resource_w = column_width(self.rows.iter().map(|r| r.resource.as_str()), "RESOURCE");
        let action_w = column_width(self.rows.iter().map(|r| r.action.as_str()), "ACTION");

        let mut text = format!(
            "{:role_w$}  {:resource_w$}  {:action_w$}  RESTRICTION",
            "ROLE", "RESOURCE", "ACTION"
        );
        for row in &self.rows {
            text.push('\n');
            text.push_str(&format!(
                "{:role_w$}  {:resource_w$}  {:action_w$}  {}",
                row.role, row.resource, row.action, row.restriction
            ));
        }
        text
    }

    fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.rows)
    }
}

fn column_width<'a>(cells: impl Iterator<Item = &'a str>, header: &str) -> usize {
    cells.map(str::len).chain([header.len()]).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_report_text() {
        let report = CheckReport {
            source: "policy.yaml".to_string(),
            valid: false,
            roles: 2,
            resources: 1,
            actions: 1,
            cells: 0,
            problems: vec!["first".to_string(), "second".to_string()],
        };
        assert_eq!(
            report.format_text(),
            "policy.yaml: 2 problem(s)\n  - first\n  - second"
        );
    }

    #[test]
    fn test_matrix_report_aligns_columns() {
        let report = MatrixReport {
            rows: vec![MatrixRow {
                role: "super_admin".to_string(),
                resource: "system".to_string(),
                action: "read".to_string(),
                restriction: Restriction::All,
            }],
        };
        let text = report.format_text();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("ROLE         RESOURCE  ACTION  RESTRICTION"));
        assert_eq!(lines.next(), Some("super_admin  system    read    ALL"));
    }

    #[derive(Serialize)]
    struct Unrenderable;

    impl FormattedOutput for Unrenderable {
        fn format_text(&self) -> String {
            "unrenderable".to_string()
        }

        fn format_json(&self) -> Result<String, serde_json::Error> {
            serde_json::from_str::<u8>("not json").map(|_| String::new())
        }
    }

    #[test]
    fn test_json_failure_is_a_general_error() {
        let ctx = CommandContext {
            format: OutputFormat::Json,
            config: caseflow_common_config::CaseflowConfig::default(),
            policy_path: None,
        };
        let mut out = Vec::new();
        let err = write_output(&ctx, &Unrenderable, &mut out).unwrap_err();

        assert!(matches!(err, CliError::Other(_)));
        assert!(err.to_string().contains("JSON serialization failed"));
        assert_eq!(err.exit_code() as u8, crate::Exit::GeneralError as u8);
        assert!(out.is_empty());
    }
}
