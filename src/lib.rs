pub mod auth;
pub mod cleanup;
pub mod clock;
pub mod config;
pub mod email;
pub mod error;
pub mod gate;
pub mod models;
pub mod routes;
pub mod session;
pub mod storage;
