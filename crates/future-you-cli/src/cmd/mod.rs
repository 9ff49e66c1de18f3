pub mod config;
pub mod init;
pub mod languages;
pub mod reflections;
pub mod serve;
