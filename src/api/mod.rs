// api/mod.rs - Wire types shared by the mock endpoint and the diagnostic client

pub mod envelope;
pub mod params;

pub use envelope::Envelope;
pub use params::{Action, ParamsError, RawParams, RequestParams};
