// Prize domain module

#![allow(clippy::module_inception)]

pub mod prize;

pub use prize::{Prize, PrizePatch};
