pub mod booking;
pub mod clock;
pub mod error;
pub mod gate;
pub mod media;
pub mod ports;
pub mod repo;
pub mod service;
pub mod subscription;
