pub mod common;
pub mod pet;
