//! raid-sync: Discord embed and reaction bridge for raid sign-ups, with Hexagonal Architecture.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
