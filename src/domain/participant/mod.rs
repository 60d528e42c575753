// Participant domain module

#![allow(clippy::module_inception)]

pub mod participant;
pub mod value_objects;

pub use participant::{Participant, ParticipantPatch};
pub use value_objects::ParticipantName;
