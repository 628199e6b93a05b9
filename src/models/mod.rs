pub mod response;
pub mod users;
pub mod wishes;
