//! Client, state machines and same-origin gateway for the Humanoid Robotics
//! Textbook chat widget and its "Ask AI about Selection" popup.

pub mod config;
pub mod error;
pub mod message;
pub mod routes;
pub mod services;
pub mod state;
