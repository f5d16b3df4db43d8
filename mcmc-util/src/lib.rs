pub mod chain;
pub mod traits;
