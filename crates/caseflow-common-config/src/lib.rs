//! Configuration for Caseflow.
//!
//! Application settings live in `.caseflow/config.yaml`; the same loader
//! reads policy files. Both support `${VAR}` and `${VAR:-default}`
//! expansion before YAML parsing.

pub mod env;
pub mod loader;
pub mod types;

pub use loader::*;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_sensible_values() {
        let config = CaseflowConfig::default();

        assert!(config.policy.path.is_none());
        assert!(!config.policy.strict);
        assert_eq!(config.gate.resolver_timeout_ms, 5000);
        assert!(!config.gate.audit_grants);
        assert_eq!(config.log.level, "info");
        assert_eq!(config.log.format, "pretty");
        assert!(config.log.file.is_none());
    }

    #[test]
    fn test_config_serializes_to_yaml() {
        let yaml = serde_yaml::to_string(&CaseflowConfig::default()).unwrap();

        assert!(yaml.contains("policy:"));
        assert!(yaml.contains("gate:"));
        assert!(yaml.contains("log:"));
        assert!(yaml.contains("resolver_timeout_ms: 5000"));
    }

    #[test]
    fn test_partial_configs_merge_with_defaults() {
        let config: CaseflowConfig = serde_yaml::from_str("gate:\n  audit_grants: true\n").unwrap();

        assert!(config.gate.audit_grants);
        assert_eq!(config.gate.resolver_timeout_ms, 5000);
        assert_eq!(config.log.format, "pretty");
    }
}
