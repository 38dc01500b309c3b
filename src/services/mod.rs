//! Board-cycle services shared by every board kind.
//!
//! ARCHITECTURE
//! ============
//! `temporal` and `reward` turn raw records into renderable entities,
//! `render` bounds the text body, and `scheduler` drives each board's
//! refresh loop and delivery.

pub mod render;
pub mod reward;
pub mod scheduler;
pub mod temporal;
