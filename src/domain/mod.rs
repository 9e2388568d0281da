//! Domain layer: entities, value objects and state machines. No I/O.

pub mod billing;
pub mod foundation;
pub mod membership;
