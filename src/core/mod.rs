//! Core scheduling modules
//!
//! Contains the worker pool and the batched parallel executor that the
//! per-vertex kernels run on.

pub mod executor;
