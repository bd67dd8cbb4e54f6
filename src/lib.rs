pub mod api;
pub mod app;
pub mod cli;
pub mod controller;
pub mod error;
pub mod models;
pub mod view;
pub mod websocket;

pub use app::run;
