//! # Ledger Client Test Suite
//!
//! End-to-end flows through the client runtime against a scripted node.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── support.rs          # Scripted node, runtime harness, ledger fixtures
//!     ├── submission_flow.rs  # Submit, status notifications, completion
//!     ├── transfer_flow.rs    # Staging against the ledger view
//!     └── connection_flow.rs  # Socket reuse, delayed close, refused dials
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p lc-tests
//! cargo test -p lc-tests integration::submission_flow
//! ```

#![allow(dead_code)]

pub mod integration;
