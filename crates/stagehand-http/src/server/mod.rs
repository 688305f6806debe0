pub mod lifecycle;

pub use lifecycle::start_server;
