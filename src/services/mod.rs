pub mod ask_panel;
pub mod client;
pub mod conversation;
pub mod gateway;
pub mod selection;
