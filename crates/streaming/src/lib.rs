pub mod orchestrator;
pub mod protocol;
pub mod request;
pub mod source;

pub use orchestrator::*;
pub use protocol::*;
pub use request::*;
pub use source::*;
