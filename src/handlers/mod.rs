pub mod admin;
pub mod protected;
