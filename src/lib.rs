// src/lib.rs — Library root for weekcoach

pub mod activity;
pub mod cli;
pub mod content;
pub mod infra;
pub mod provider;
pub mod session;
