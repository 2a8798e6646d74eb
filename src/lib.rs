// File: lib.rs
// Location: /src/lib.rs

pub mod config;
pub mod line_mode;
pub mod qr;
pub mod shell;
pub mod window;
