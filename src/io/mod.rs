//! File export of run outputs.

pub mod export;
