// src/models/mod.rs

pub mod achievement;
pub mod category;
pub mod game_session;
pub mod question;
pub mod quiz;
pub mod user;
