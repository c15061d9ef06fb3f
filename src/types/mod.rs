// Fundamental types of the Casper FFG engine
// Principle: Minimal, auditable, durable

pub mod primitives;
pub mod signature;
pub mod vote;

pub use primitives::*;
pub use signature::*;
pub use vote::*;
