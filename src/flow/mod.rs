pub mod definition;
pub mod validate;

pub use definition::*;
pub use validate::*;
