//! # System Interaction Layer
//!
//! The boundary between the engine and the terminal/filesystem streams it
//! reads from.
//!
//! ## Modules
//!
//! - **`input`**: the interactive line editor, the comment-skipping batch
//!   line reader, and the blocking wait-for-key primitive.

pub mod input;
