pub mod auth;
pub mod branch;
pub mod cart;
