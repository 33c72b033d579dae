pub mod auth;
pub mod events;
pub mod expenses;
pub mod families;
pub mod medicines;
pub mod schedules;
pub mod users;
