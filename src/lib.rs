pub mod auth;
pub mod config;
pub mod domain;
pub mod extract;
pub mod gmail;
pub mod triage;

#[cfg(test)]
mod testing;
