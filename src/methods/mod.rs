pub mod admin;
pub mod booking;
pub mod catalog;
pub mod id_allocator;
pub mod rental_rate;
pub mod standard_replies;
pub mod store_fn;
pub mod tokens;
pub mod user;
