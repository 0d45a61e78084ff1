pub mod agency;
pub mod booking;
pub mod category;
pub mod company;
pub mod listing;
