//! Conversion of forge source archives into Ansible Galaxy collection artifacts.

pub mod builder;
pub mod error;
pub mod tree;
pub mod types;
