//! # heap-navigator
//!
//! Graph queries over an already indexed Java heap snapshot.
//!
//! ## Architecture
//!
//! - **model**: Snapshot entities (classes, instances, field values, GC roots)
//! - **heap**: The `HeapModel` trait the navigator reads through
//! - **memory**: In-memory `HeapModel` with nearest-GC-root computation
//! - **dump**: JSON snapshot files, memory-mapped and digested on load
//! - **descriptor**: Class descriptor parsing (object ids, primitive codes, array dims)
//! - **identity**: `java.lang.Class` mirror normalization
//! - **weak**: Weak-reference class detection and classification
//! - **reachability**: Nearest root, root distance, class instance traversal
//! - **references**: Referrer and referee enumeration
//! - **finalizer**: Finalizer queue walk
//! - **render**: Display strings for strings and char arrays
//! - **excludes**: Reachable-excludes policy
//! - **navigator**: `HeapNavigator`, the query-facing entry point
//! - **report**: Serializable views for CLI output

pub mod cli;
pub mod config;
pub mod descriptor;
pub mod dump;
pub mod excludes;
pub mod finalizer;
pub mod heap;
pub mod identity;
pub mod memory;
pub mod model;
pub mod navigator;
pub mod reachability;
pub mod references;
pub mod render;
pub mod report;
pub mod weak;
