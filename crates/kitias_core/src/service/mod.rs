//! Use-case services over the repository layer.

pub mod attendance_provider;
pub mod outcome;
