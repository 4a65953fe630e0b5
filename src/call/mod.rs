//! Call module - the operations callers can submit and the signed envelope
//! that carries them to the node.

mod signed;
mod types;

pub use signed::*;
pub use types::*;
