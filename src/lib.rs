//! Lottery API Library
//!
//! Lottery rooms with prizes and self-registered participants, random
//! drawing of winners, and live change feeds. The crate provides the domain
//! logic, repositories, services and the HTTP adapter.

pub mod api;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod realtime;
pub mod service;
