pub mod event;
pub mod freeze;
pub mod game;
pub mod history;
pub mod store;
pub mod timer;
