pub mod request;
pub mod response;
pub mod rule;
pub mod transaction;
