//! Request handlers

pub mod admin;
pub mod articles;
pub mod contact;
pub mod health;
