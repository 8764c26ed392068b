pub mod client;

pub use client::{BrainApi, HttpBrainApi};
