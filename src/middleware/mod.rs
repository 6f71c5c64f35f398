pub mod panic;
pub mod response;

pub use panic::panic_to_envelope;
pub use response::EnvelopeResponse;
