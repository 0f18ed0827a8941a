//! noisekit CLI
//!
//! Command-line front end over `noisekit-crypto`: generate keys, run an
//! exchange, derive subkeys, seal and open messages.

pub mod cli;
pub mod commands;
pub mod hexio;
