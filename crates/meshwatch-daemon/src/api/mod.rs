mod handlers;
mod responses;
mod server;


pub use server::{router, serve, AppState};
