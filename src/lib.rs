// Modern Homepage Library Entry Point
// This file exposes all modules so they can be imported by main.rs
// and tested independently.

pub mod cli;
pub mod dashboard;
pub mod error;
pub mod settings;
pub mod state;
pub mod storage;

// Pure logic modules (no storage access)
pub mod modules;

pub use dashboard::Dashboard;
pub use error::{DashboardError, Result};
pub use state::{AppState, QuickLink, SharedDashboard, Tab};
pub use storage::{FileStorage, MemoryStorage, StateStorage};
