//! API request handlers

pub mod todos;
pub mod performance;
pub mod requests;
pub mod procurements;
pub mod assets;
pub mod meetings;
pub mod visitors;
