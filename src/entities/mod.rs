pub mod booking;
pub mod car_owner;
pub mod review;
pub mod service;
pub mod shop_owner;
pub mod user;
pub mod vehicle;
