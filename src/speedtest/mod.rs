pub mod client;
pub mod requests;
pub mod tests;
pub mod transport;
