//! Flutter-facing FFI crate for the StockPad core.

pub mod api;
