pub mod backup;
pub mod cli;
pub mod config;
pub mod publish;
