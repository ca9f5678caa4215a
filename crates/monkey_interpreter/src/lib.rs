mod builtin;
mod environment;
mod error;
mod evaluator;
pub mod object;

pub use builtin::Builtin;
pub use environment::Environment;
pub use error::RuntimeError;
pub use evaluator::Evaluator;
