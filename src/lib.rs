// PDF Genius - chat-driven analysis of PDF documents against a local model

pub mod config;
pub mod models;
pub mod types;
pub mod llm;       // Model catalog, selection state and generation params
pub mod documents;
pub mod backend;   // Analysis gateway and the simulated service
pub mod router;
pub mod session;
pub mod analysis;  // Chart data, CSV export and PNG rendering
pub mod scheduler;
pub mod monitor;
pub mod settings;  // Persisted theme preference
pub mod tui;       // Terminal User Interface
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use session::{ConversationController, SessionState};
pub use types::{BackendError, SessionError};
