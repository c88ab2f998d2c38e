pub mod server;

pub use server::HealthServer;
