//! Append-only log of shelter assignments.

pub mod entity;
