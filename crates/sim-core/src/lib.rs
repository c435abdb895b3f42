//! Shared support for cycle-level bus models.
//!
//! Models advance only when their driver calls them on a clock edge. They
//! count those edges in [`Cycles`] and expose their internal state through
//! [`Observable`] for tests and debugging.

mod cycles;
mod observable;

pub use cycles::Cycles;
pub use observable::{Observable, Value};
