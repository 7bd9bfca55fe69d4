// Console rendering for the CLI binaries
pub mod report;
