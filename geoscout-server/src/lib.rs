pub mod http;
pub mod router;
pub mod session;
pub mod subsystems;
