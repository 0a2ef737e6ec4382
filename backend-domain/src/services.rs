// Domain services

pub mod replay;

pub use replay::*;
