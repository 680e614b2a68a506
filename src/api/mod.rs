pub mod auth;
pub mod command;
pub mod model;
pub mod websocket;
