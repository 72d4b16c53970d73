pub mod config;
pub mod error;
pub mod handlers;
pub mod libraries;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

#[cfg(test)]
mod testing;
