//! Library crate for sockaudit: point-in-time audit of suspicious sockets
//!
//! Reads the kernel connection tables, flags connections whose ports are
//! blacklisted, and resolves the owning process of each flagged socket.

pub mod error;
pub mod net;
pub mod process;
pub mod progress;
pub mod rules;
pub mod scan;

// CLI modules
pub mod cli {
    pub mod args;
}

// Format modules
pub mod formats;
