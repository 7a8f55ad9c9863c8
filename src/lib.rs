pub mod cli;
pub mod compiler;
pub mod config;
pub mod descriptor;
pub mod diagnostics;
pub mod helpers;
pub mod outcome;
pub mod policy;
pub mod render;
pub mod runner;
