pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod ratelimit;
pub mod registry;
pub mod resolver;
pub mod server;
pub mod state;
pub mod theme;
