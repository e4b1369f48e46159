#![no_std]
//! Fair single-owner lock for a shared peripheral bus.
//!
//! A [`Baton`] owns the bus value. Tasks queue for it in arrival order and
//! receive a [`BatonGuard`] that dereferences to the bus; dropping the guard
//! passes the baton on. Only the bus access itself is serialized, so tasks
//! can wait on their own wake-up sources independently and contend only for
//! the few instructions that actually touch the bus.

mod baton;
mod error;
mod guard;

pub use baton::Baton;
pub use error::BatonError;
pub use guard::BatonGuard;
