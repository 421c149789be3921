// Core module - terminal engine
pub mod communication;
pub mod session;
