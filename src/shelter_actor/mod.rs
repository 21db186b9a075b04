//! Shelter directory entity. Shelters are created by seeding and never patched.

pub mod entity;
