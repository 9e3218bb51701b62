pub mod link_controller;
pub mod link_state;
pub mod resolver;
