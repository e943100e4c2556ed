pub mod config;
pub mod core;
pub mod display;
pub mod error;
pub mod game;
pub mod logic;
pub mod network;
pub mod record;
pub mod session;
