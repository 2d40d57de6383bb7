pub mod access;
pub mod health;
pub mod projects;
pub mod security;
pub mod users;
