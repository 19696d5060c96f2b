pub mod auth;
pub mod bookings;
pub mod onboarding;
pub mod profile;
pub mod reviews;
pub mod services;
pub mod shops;
pub mod stats;
pub mod vehicles;
