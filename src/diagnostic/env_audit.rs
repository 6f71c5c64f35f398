use std::collections::HashMap;
use std::time::Duration;

use regex::Regex;
use serde::Serialize;

use super::client::{ApiRequest, DiagnosticClient};
use super::result::{DiagnosticResult, Outcome};
use crate::config::ClientConfig;

const NOT_SET: &str = "NOT SET";

/// Variables whose absence breaks the client outright
pub const CRITICAL_VARS: [&str; 2] = ["NEXT_PUBLIC_API_URL", "NEXT_PUBLIC_API_TOKEN"];

/// Expected shape of one configuration variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarSpec {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub pattern: Option<String>,
    pub allowed_values: Vec<String>,
    pub min_length: Option<usize>,
    pub example: String,
}

impl VarSpec {
    pub fn required(name: &str, description: &str, example: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            required: true,
            pattern: None,
            allowed_values: Vec::new(),
            min_length: None,
            example: example.to_string(),
        }
    }

    pub fn optional(name: &str, description: &str, example: &str) -> Self {
        Self {
            required: false,
            ..Self::required(name, description, example)
        }
    }

    pub fn pattern(mut self, pattern: &str) -> Self {
        self.pattern = Some(pattern.to_string());
        self
    }

    pub fn allowed_values(mut self, values: &[&str]) -> Self {
        self.allowed_values = values.iter().map(|v| v.to_string()).collect();
        self
    }

    pub fn min_length(mut self, len: usize) -> Self {
        self.min_length = Some(len);
        self
    }
}

/// The variables a ServesPlatform frontend deployment is expected to define
pub fn default_specs() -> Vec<VarSpec> {
    vec![
        VarSpec::required(
            "NEXT_PUBLIC_API_URL",
            "Mock API endpoint URL",
            "https://script.google.com/macros/s/AKfycbw.../exec",
        )
        .pattern(r"^https?://[^\s/]+(/macros/s/[A-Za-z0-9_-]+)?/exec$"),
        VarSpec::required(
            "NEXT_PUBLIC_API_TOKEN",
            "API authentication token",
            "serves-platform-2024-api-key",
        )
        .min_length(10),
        VarSpec::optional("NEXT_PUBLIC_APP_NAME", "Application name", "ServesPlatform"),
        VarSpec::optional("NEXT_PUBLIC_APP_VERSION", "Application version", "1.0.0"),
        VarSpec::required("NODE_ENV", "Node environment", "development")
            .allowed_values(&["development", "production", "test"]),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VarStatus {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VarResult {
    pub name: String,
    /// Masked value, or `NOT SET`
    pub value: String,
    pub status: VarStatus,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub variable: String,
    pub description: String,
    pub issue: String,
    pub solution: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnvAudit {
    pub variables: Vec<VarResult>,
    pub success_count: usize,
    pub warning_count: usize,
    pub error_count: usize,
    pub recommendations: Vec<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connectivity: Option<DiagnosticResult>,
}

/// Classify one variable. Empty strings count as unset.
pub fn verify_var(spec: &VarSpec, value: Option<&str>) -> VarResult {
    let value = value.filter(|v| !v.is_empty());

    let Some(value) = value else {
        let (status, issue) = if spec.required {
            (VarStatus::Error, "Required variable is not set")
        } else {
            (VarStatus::Warning, "Optional variable is not set")
        };
        return VarResult {
            name: spec.name.clone(),
            value: NOT_SET.to_string(),
            status,
            issues: vec![issue.to_string()],
        };
    };

    let mut issues = Vec::new();

    if let Some(pattern) = &spec.pattern {
        match Regex::new(pattern) {
            Ok(re) if re.is_match(value) => {}
            Ok(_) => issues.push("Value doesn't match expected pattern".to_string()),
            Err(e) => issues.push(format!("Pattern '{}' is invalid: {}", pattern, e)),
        }
    }

    if !spec.allowed_values.is_empty() && !spec.allowed_values.iter().any(|v| v == value) {
        issues.push(format!("Value must be one of: {}", spec.allowed_values.join(", ")));
    }

    if let Some(min) = spec.min_length {
        if value.chars().count() < min {
            issues.push(format!("Value must be at least {} characters long", min));
        }
    }

    VarResult {
        name: spec.name.clone(),
        value: mask(value),
        status: if issues.is_empty() { VarStatus::Success } else { VarStatus::Error },
        issues,
    }
}

/// Check every spec against `vars`; one bad variable never stops the rest
pub fn audit(specs: &[VarSpec], vars: &HashMap<String, String>) -> EnvAudit {
    let variables: Vec<VarResult> = specs
        .iter()
        .map(|spec| verify_var(spec, vars.get(&spec.name).map(String::as_str)))
        .collect();

    let count = |status: VarStatus| variables.iter().filter(|r| r.status == status).count();
    let success_count = count(VarStatus::Success);
    let warning_count = count(VarStatus::Warning);
    let error_count = count(VarStatus::Error);

    let recommendations = recommendations(specs, &variables);

    EnvAudit {
        variables,
        success_count,
        warning_count,
        error_count,
        recommendations,
        connectivity: None,
    }
}

fn recommendations(specs: &[VarSpec], results: &[VarResult]) -> Vec<Recommendation> {
    results
        .iter()
        .filter(|r| r.status == VarStatus::Error)
        .filter_map(|r| {
            let spec = specs.iter().find(|s| s.name == r.name)?;
            Some(Recommendation {
                variable: r.name.clone(),
                description: spec.description.clone(),
                issue: r.issues.join(", "),
                solution: format!("Set {}={}", spec.name, spec.example),
            })
        })
        .collect()
}

/// `NAME=example` lines for every required variable
pub fn env_template(specs: &[VarSpec]) -> Vec<String> {
    specs
        .iter()
        .filter(|s| s.required)
        .map(|s| format!("{}={}", s.name, s.example))
        .collect()
}

/// Presence of the variables the client cannot work without
pub fn quick_check(vars: &HashMap<String, String>) -> Vec<(&'static str, bool)> {
    CRITICAL_VARS
        .iter()
        .map(|name| (*name, vars.get(*name).map(|v| !v.is_empty()).unwrap_or(false)))
        .collect()
}

/// Probe the endpoint named by the audited variables with a `whoami` call
pub async fn probe_connectivity(vars: &HashMap<String, String>, timeout: Duration) -> DiagnosticResult {
    let url = vars.get("NEXT_PUBLIC_API_URL").filter(|v| !v.is_empty());
    let token = vars.get("NEXT_PUBLIC_API_TOKEN").filter(|v| !v.is_empty());

    let (Some(url), Some(token)) = (url, token) else {
        return DiagnosticResult::fault(Outcome::Skipped, "Missing API URL or token", "");
    };

    match DiagnosticClient::new(&ClientConfig::new(url.as_str(), token.as_str(), timeout)) {
        Ok(client) => client.send(&ApiRequest::action("whoami")).await,
        Err(e) => DiagnosticResult::fault(Outcome::Transport, e.to_string(), url.as_str()),
    }
}

/// One line of the client configuration check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigCheck {
    pub name: String,
    pub description: String,
    pub value: String,
    pub valid: bool,
}

/// Sanity checks on the configuration the diagnostic client itself runs with
pub fn verify_client_config(config: &ClientConfig) -> Vec<ConfigCheck> {
    let url_valid = config.endpoint_url().is_ok();

    vec![
        ConfigCheck {
            name: "apiUrl".to_string(),
            description: "API endpoint URL".to_string(),
            value: config.base_url.clone(),
            valid: url_valid,
        },
        ConfigCheck {
            name: "apiToken".to_string(),
            description: "API Token".to_string(),
            value: if config.token.is_empty() { NOT_SET.to_string() } else { mask(&config.token) },
            valid: config.token.chars().count() > 10,
        },
        ConfigCheck {
            name: "timeout".to_string(),
            description: "Request Timeout".to_string(),
            value: format!("{}ms", config.timeout_ms),
            valid: config.timeout_ms > 0,
        },
    ]
}

/// `***` followed by the last four characters when the value is long enough to hide the rest
pub fn mask(value: &str) -> String {
    let len = value.chars().count();
    if len <= 8 {
        return "***".to_string();
    }
    let tail: String = value.chars().skip(len - 4).collect();
    format!("***{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn unset_required_variable_is_error() {
        let audit = audit(
            &default_specs(),
            &vars(&[
                ("NEXT_PUBLIC_API_TOKEN", "serves-platform-2024-api-key"),
                ("NODE_ENV", "development"),
            ]),
        );

        let url = audit.variables.iter().find(|v| v.name == "NEXT_PUBLIC_API_URL").unwrap();
        assert_eq!(url.status, VarStatus::Error);
        assert_eq!(url.issues, vec!["Required variable is not set".to_string()]);
        assert_eq!(url.value, "NOT SET");

        assert_eq!(audit.success_count, 2);
        assert_eq!(audit.warning_count, 2);
        assert_eq!(audit.error_count, 1);
        assert_eq!(audit.recommendations.len(), 1);
        assert_eq!(
            audit.recommendations[0].solution,
            "Set NEXT_PUBLIC_API_URL=https://script.google.com/macros/s/AKfycbw.../exec"
        );
    }

    #[test]
    fn every_failed_rule_is_reported() {
        let spec = VarSpec::required("X", "x", "abcdefghijk")
            .pattern("^[a-z]+$")
            .allowed_values(&["abcdefghijk"])
            .min_length(10);
        let result = verify_var(&spec, Some("ABC"));
        assert_eq!(result.status, VarStatus::Error);
        assert_eq!(result.issues.len(), 3);
        assert_eq!(result.issues[1], "Value must be one of: abcdefghijk");
        assert_eq!(result.issues[2], "Value must be at least 10 characters long");
    }

    #[test]
    fn url_pattern_accepts_script_and_local_endpoints() {
        let spec = &default_specs()[0];
        for ok in [
            "https://script.google.com/macros/s/AKfycbw_abc-123/exec",
            "http://127.0.0.1:3000/exec",
        ] {
            assert_eq!(verify_var(spec, Some(ok)).status, VarStatus::Success, "{}", ok);
        }
        assert_eq!(verify_var(spec, Some("https://example.com/api")).status, VarStatus::Error);
    }

    #[test]
    fn empty_and_optional_values() {
        let required = VarSpec::required("A", "a", "1");
        assert_eq!(verify_var(&required, Some("")).status, VarStatus::Error);

        let optional = VarSpec::optional("B", "b", "1");
        let r = verify_var(&optional, None);
        assert_eq!(r.status, VarStatus::Warning);
        assert_eq!(r.issues, vec!["Optional variable is not set".to_string()]);
    }

    #[test]
    fn invalid_pattern_is_an_issue_not_a_panic() {
        let spec = VarSpec::required("A", "a", "1").pattern("(");
        let r = verify_var(&spec, Some("value"));
        assert_eq!(r.status, VarStatus::Error);
        assert!(r.issues[0].starts_with("Pattern '(' is invalid"));
    }

    #[test]
    fn template_lists_required_only() {
        let lines = env_template(&default_specs());
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "NODE_ENV=development");
    }

    #[test]
    fn quick_check_reports_presence() {
        let report = quick_check(&vars(&[("NEXT_PUBLIC_API_URL", "http://x/exec"), ("NEXT_PUBLIC_API_TOKEN", "")]));
        assert_eq!(report, vec![("NEXT_PUBLIC_API_URL", true), ("NEXT_PUBLIC_API_TOKEN", false)]);
    }

    #[test]
    fn client_config_checks() {
        let checks = verify_client_config(&ClientConfig::default());
        assert!(checks.iter().all(|c| c.valid));
        assert_eq!(checks[1].value, "***2024");

        let bad = ClientConfig {
            base_url: "ftp://host/exec".to_string(),
            token: "short".to_string(),
            timeout_ms: 0,
        };
        assert!(verify_client_config(&bad).iter().all(|c| !c.valid));
    }

    #[test]
    fn masking() {
        assert_eq!(mask("short"), "***");
        assert_eq!(mask("serves-platform-2024-api-key"), "***-key");
    }

    #[tokio::test]
    async fn probe_is_skipped_without_url_or_token() {
        let result = probe_connectivity(&vars(&[]), Duration::from_secs(1)).await;
        assert_eq!(result.outcome, Outcome::Skipped);
        assert_eq!(result.error.as_deref(), Some("Missing API URL or token"));
    }
}
