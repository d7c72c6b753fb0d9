/*!
 * Process Module
 * Process descriptions and the per-run state store
 */

pub mod store;
pub mod types;

// Re-export for convenience
pub use self::store::RunState;
pub use self::types::{ProcessEntry, ProcessSpec, ProcessState};
