use std::time::Instant;

use serde::Serialize;

use super::client::{ApiRequest, DiagnosticClient, Transport};
use super::env_audit::{verify_client_config, ConfigCheck};
use super::result::{DiagnosticResult, Outcome};
use crate::config::{ClientConfig, DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD};
use crate::models::MATERIALS_TABLE;

pub const CONNECTIVITY: &str = "Basic connectivity test";
pub const AUTHENTICATION: &str = "Authentication with test credentials";
pub const LIST_MATERIALS: &str = "List materials";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckGroup {
    Connectivity,
    Authentication,
    Materials,
    ErrorHandling,
    Transports,
    Custom,
}

/// What a check counts as a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expectation {
    Accepted,
    Rejected { status: u16 },
}

impl Expectation {
    pub fn is_met(&self, result: &DiagnosticResult) -> bool {
        match self {
            Expectation::Accepted => result.success,
            Expectation::Rejected { status } => {
                result.outcome == Outcome::ApplicationError && result.status == Some(*status)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Check {
    pub name: String,
    pub group: CheckGroup,
    pub request: ApiRequest,
    pub expect: Expectation,
}

impl Check {
    pub fn new(name: impl Into<String>, group: CheckGroup, request: ApiRequest) -> Self {
        Self {
            name: name.into(),
            group,
            request,
            expect: Expectation::Accepted,
        }
    }

    pub fn rejected_with(mut self, status: u16) -> Self {
        self.expect = Expectation::Rejected { status };
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub name: String,
    pub group: CheckGroup,
    pub expectation: Expectation,
    pub passed: bool,
    pub result: DiagnosticResult,
}

/// Credentials used by the authentication check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            email: DEFAULT_ADMIN_EMAIL.to_string(),
            password: DEFAULT_ADMIN_PASSWORD.to_string(),
        }
    }
}

pub fn connectivity_check() -> Check {
    Check::new(CONNECTIVITY, CheckGroup::Connectivity, ApiRequest::action("whoami"))
}

pub fn authentication_check(credentials: &Credentials) -> Check {
    Check::new(
        AUTHENTICATION,
        CheckGroup::Authentication,
        ApiRequest::action("auth")
            .param("email", &credentials.email)
            .param("password", &credentials.password),
    )
}

/// List, get, create, update, delete. Only `list` returns records; the others
/// are answered with an empty list and still count as accepted.
pub fn materials_checks() -> Vec<Check> {
    let crud = |operation: &str| {
        ApiRequest::action("crud")
            .param("operation", operation)
            .param("table", MATERIALS_TABLE)
    };

    vec![
        Check::new(LIST_MATERIALS, CheckGroup::Materials, crud("list")),
        Check::new("Get specific material", CheckGroup::Materials, crud("get").param("id", "MAT001")),
        Check::new(
            "Create new material",
            CheckGroup::Materials,
            crud("create").params([
                ("descripcion", "Test Material"),
                ("categoria", "Test Category"),
                ("unidad", "kg"),
                ("costo_ref", "100"),
            ]),
        ),
        Check::new(
            "Update material",
            CheckGroup::Materials,
            crud("update").param("id", "MAT001").param("descripcion", "Updated Test Material"),
        ),
        Check::new("Delete material", CheckGroup::Materials, crud("delete").param("id", "MAT001")),
    ]
}

pub fn error_handling_checks(credentials: &Credentials) -> Vec<Check> {
    vec![
        Check::new(
            "Invalid API token",
            CheckGroup::ErrorHandling,
            ApiRequest::action("whoami").with_token("invalid-token"),
        )
        .rejected_with(401),
        Check::new(
            "Missing API token",
            CheckGroup::ErrorHandling,
            ApiRequest::action("whoami").without_token(),
        )
        .rejected_with(401),
        Check::new(
            "Invalid credentials",
            CheckGroup::ErrorHandling,
            ApiRequest::action("auth")
                .param("email", &credentials.email)
                .param("password", "wrong-password"),
        )
        .rejected_with(401),
        // The endpoint does not validate these; an empty list is the current answer
        Check::new("Missing required parameters", CheckGroup::ErrorHandling, ApiRequest::action("crud")),
        Check::new(
            "Invalid CRUD operation",
            CheckGroup::ErrorHandling,
            ApiRequest::action("crud")
                .param("operation", "invalid")
                .param("table", MATERIALS_TABLE),
        ),
        Check::new("Invalid action", CheckGroup::ErrorHandling, ApiRequest::action("invalid-action")),
    ]
}

/// The same `whoami` call over every supported way of sending parameters
pub fn transport_checks() -> Vec<Check> {
    Transport::ALL
        .iter()
        .map(|t| {
            Check::new(
                format!("Token via {}", t.label()),
                CheckGroup::Transports,
                ApiRequest::action("whoami").via(*t),
            )
        })
        .collect()
}

pub fn endpoint_check<I, K, V>(action: &str, params: I, transport: Transport) -> Check
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    Check::new(
        format!("Custom test: {}", action),
        CheckGroup::Custom,
        ApiRequest::action(action).params(params).via(transport),
    )
}

/// Success/failure counts for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    /// Results with `success=true`
    pub successful: usize,
    pub failed: usize,
    /// Checks whose expectation held, including expected rejections
    pub passed: usize,
}

impl Summary {
    pub fn tally(outcomes: &[CheckOutcome]) -> Self {
        let successful = outcomes.iter().filter(|o| o.result.success).count();
        Self {
            total: outcomes.len(),
            successful,
            failed: outcomes.len() - successful,
            passed: outcomes.iter().filter(|o| o.passed).count(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    pub issue: String,
    pub steps: Vec<String>,
}

/// Suggested next steps for the failures that matter most
pub fn troubleshoot(outcomes: &[CheckOutcome]) -> Vec<Issue> {
    let failed = |name: &str| {
        outcomes
            .iter()
            .find(|o| o.name == name)
            .map(|o| !o.result.success)
            .unwrap_or(false)
    };

    let mut issues = Vec::new();

    if failed(CONNECTIVITY) {
        issues.push(Issue {
            issue: "Cannot connect to API".to_string(),
            steps: vec![
                "Verify the endpoint URL is correct".to_string(),
                "Check that the mock server is running and reachable".to_string(),
                "Ensure the shared token matches the server's SERVES_API_TOKEN".to_string(),
                "Check network connectivity and firewall settings".to_string(),
            ],
        });
    }

    if failed(AUTHENTICATION) {
        issues.push(Issue {
            issue: "Authentication failing".to_string(),
            steps: vec![
                "Verify test credentials are correct".to_string(),
                "Ensure API token is valid".to_string(),
                "Check SERVES_ADMIN_EMAIL and SERVES_ADMIN_PASSWORD on the server".to_string(),
            ],
        });
    }

    if failed(LIST_MATERIALS) {
        issues.push(Issue {
            issue: "Materials CRUD operations failing".to_string(),
            steps: vec![
                format!("Verify the table parameter is exactly '{}'", MATERIALS_TABLE),
                "Ensure all required parameters are being sent".to_string(),
                "Check server logs for errors".to_string(),
            ],
        });
    }

    issues
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticReport {
    pub config: Vec<ConfigCheck>,
    pub checks: Vec<CheckOutcome>,
    pub summary: Summary,
    pub troubleshooting: Vec<Issue>,
    pub total_time_ms: u64,
}

/// Runs checks against one endpoint, strictly one request at a time
#[derive(Debug, Clone)]
pub struct Diagnostics {
    client: DiagnosticClient,
    credentials: Credentials,
}

impl Diagnostics {
    pub fn new(client: DiagnosticClient, credentials: Credentials) -> Self {
        Self { client, credentials }
    }

    pub fn client(&self) -> &DiagnosticClient {
        &self.client
    }

    pub async fn run(&self, check: &Check) -> CheckOutcome {
        tracing::info!(check = %check.name, action = check.request.action_name(), "running check");
        let result = self.client.send(&check.request).await;
        let passed = check.expect.is_met(&result);

        if passed {
            tracing::info!(check = %check.name, "check passed");
        } else {
            tracing::debug!(check = %check.name, error = result.error.as_deref().unwrap_or(""), "check failed");
        }

        CheckOutcome {
            name: check.name.clone(),
            group: check.group,
            expectation: check.expect,
            passed,
            result,
        }
    }

    pub async fn run_all(&self, checks: &[Check]) -> Vec<CheckOutcome> {
        let mut outcomes = Vec::with_capacity(checks.len());
        for check in checks {
            outcomes.push(self.run(check).await);
        }
        outcomes
    }

    pub async fn quick_test(&self) -> CheckOutcome {
        self.run(&connectivity_check()).await
    }

    pub async fn test_authentication(&self) -> CheckOutcome {
        self.run(&authentication_check(&self.credentials)).await
    }

    pub async fn test_materials_crud(&self) -> Vec<CheckOutcome> {
        self.run_all(&materials_checks()).await
    }

    pub async fn test_error_handling(&self) -> Vec<CheckOutcome> {
        self.run_all(&error_handling_checks(&self.credentials)).await
    }

    pub async fn test_transports(&self) -> Vec<CheckOutcome> {
        self.run_all(&transport_checks()).await
    }

    pub async fn test_endpoint<I, K, V>(&self, action: &str, params: I, transport: Transport) -> CheckOutcome
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.run(&endpoint_check(action, params, transport)).await
    }

    /// Configuration check, then every named check in order
    pub async fn run_full_diagnostic(&self, config: &ClientConfig) -> DiagnosticReport {
        let started = Instant::now();
        let config_checks = verify_client_config(config);

        let mut checks = vec![connectivity_check(), authentication_check(&self.credentials)];
        checks.extend(materials_checks());
        checks.extend(error_handling_checks(&self.credentials));
        checks.extend(transport_checks());

        let outcomes = self.run_all(&checks).await;
        let summary = Summary::tally(&outcomes);
        let troubleshooting = troubleshoot(&outcomes);

        DiagnosticReport {
            config: config_checks,
            checks: outcomes,
            summary,
            troubleshooting,
            total_time_ms: started.elapsed().as_millis() as u64,
        }
    }
}
