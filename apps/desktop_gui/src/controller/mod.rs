//! Controller layer: UI actions, error modeling and dispatch into the session.

pub mod events;
pub mod orchestration;
