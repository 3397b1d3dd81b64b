//! Cross-cutting pieces shared by the generator and engine crates:
//! cancellation, the attempt sink boundary, and tracing setup.

mod cancellation;
mod sink;
mod tracing_setup;

pub use cancellation::CancellationToken;
pub use sink::{AttemptSink, VecAttemptSink};
pub use tracing_setup::init_tracing;
