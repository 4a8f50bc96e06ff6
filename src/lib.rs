pub mod classify;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod language;
pub mod materialize;
pub mod runner;
