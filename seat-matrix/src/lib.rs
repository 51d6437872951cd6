//! Seat matrix engine for Bangladesh Railway trains.
//!
//! Given a train and a travel date, fetches the stop schedule, resolves
//! the calendar date of every stop across midnight, and fills an all-pairs
//! fare and availability matrix per seat class. Route queries then compose
//! direct, segmented and mixed-class tickets from the matrix.

pub mod availability;
pub mod config;
pub mod credentials;
pub mod domain;
pub mod error;
pub mod matrix;
pub mod pool;
pub mod schedule;
pub mod shohoz;
pub mod store;
pub mod web;
