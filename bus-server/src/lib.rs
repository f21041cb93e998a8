//! Bus arrival board server.
//!
//! A web front-end over LTA DataMall that answers: "When is the next bus
//! at this stop, and is it even running right now?"

pub mod alerts;
pub mod arrivals;
pub mod board;
pub mod cache;
pub mod config;
pub mod datamall;
pub mod domain;
pub mod operating;
pub mod reference;
pub mod web;
