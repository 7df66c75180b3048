//! Background tasks module
//! 
//! This module contains the background tasks spawned by the timer engine.

pub mod ticker;

pub(crate) use ticker::spawn_ticker;
