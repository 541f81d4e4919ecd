pub mod auth;
pub mod buildings;
pub mod classrooms;
pub mod departments;
pub mod requests;
pub mod users;
