pub mod debounce;
pub mod timer;

pub use debounce::*;
pub use timer::*;
