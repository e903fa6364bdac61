pub mod api_keys;
pub mod tasks;
pub mod users;
