//! External I/O shims (spec.md §2 component 9, §6): Walt's canonical CSV
//! source/sink and the dump sinks. Everything in here sits at the boundary
//! of the operator runtime -- it's the only place `anyhow::Result` rather
//! than `Result<_, QueryError>` is returned, matching the teacher's
//! `io/csv.rs` convention of reserving `anyhow::Context` for file I/O.

pub mod csv;
pub mod dump;
