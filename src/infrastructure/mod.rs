// Infrastructure layer module
// Contains database adapters and the in-memory store

pub mod repositories;
