//! Command line interface

pub mod commands;
pub mod task_input;
