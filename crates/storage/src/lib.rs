#![forbid(unsafe_code)]

pub mod memory;
pub mod repository;
pub mod rest;
pub mod sqlite;
