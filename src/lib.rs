// Fantasy basketball ranking and pickup recommendation library.
//
// The binary in main.rs is a thin wrapper around `pipeline::run`; everything
// else lives here so the full pipeline is exercisable from integration tests.

pub mod config;
pub mod matcher;
pub mod pipeline;
pub mod ranking;
pub mod report;
pub mod stats;
