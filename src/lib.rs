//! Terminal client for a band's website: concert listings, a music catalog
//! with a playlist player, and admin pages for events and songs.

pub mod audio;
pub mod auth;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod model;
pub mod player;
pub mod view;
