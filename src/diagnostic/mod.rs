// diagnostic/mod.rs - Client side: send requests to the mock endpoint and report on them
//
// client    → one request, one classified DiagnosticResult
// checks    → named checks with expectations, full-run report and tally
// env_audit → configuration variable audit, no network unless probing

pub mod checks;
pub mod client;
pub mod env_audit;
pub mod result;

pub use checks::{Check, CheckGroup, CheckOutcome, Credentials, DiagnosticReport, Diagnostics, Expectation, Summary};
pub use client::{ApiRequest, ClientError, DiagnosticClient, Transport};
pub use env_audit::{audit, default_specs, EnvAudit, VarSpec, VarStatus};
pub use result::{DiagnosticResult, Outcome};
