pub mod error;
pub mod protocol;
pub mod server;
pub mod tools;

// --- Public API ---
pub use error::ServerError;
pub use server::McpServer;
pub use tools::tool_catalogue;
