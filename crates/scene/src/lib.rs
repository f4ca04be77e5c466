pub mod extent;
pub mod feature;
pub mod framing;
pub mod selection;
pub mod style;

pub use extent::*;
pub use feature::*;
pub use framing::*;
pub use selection::*;
pub use style::*;
