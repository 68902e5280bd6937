pub mod options;
pub mod segment;

pub use options::*;
pub use segment::*;
