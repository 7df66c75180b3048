//! External service module
//! 
//! This module contains the collaborators the timer host talks to: the
//! alarm command and the on-disk state store.

pub mod alarm;
pub mod persistence;

// Re-export main types
pub use alarm::{play_alarm, AlarmListener};
pub use persistence::{Preferences, StateStore};
