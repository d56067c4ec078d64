pub mod classify;
pub mod clear;
pub mod columns;
pub mod config;
pub mod export;
pub mod import;
pub mod status;
