// ============================================================================
// Core Actor Abstractions
// ============================================================================
//
// Health types shared by the infrastructure actors.
//
// ============================================================================

pub mod health;

// Re-export core types
pub use health::*;
