// Copyright 2023-2024 The Regents of the University of California
// Copyright 2024-2025 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! Read signal values from a running RTL simulation by hierarchical name,
//! through the Verilog Procedural Interface (VPI). Link this crate into a
//! testbench or co-simulation harness that runs inside a VPI-capable
//! simulator, e.g., Verilator with `verilated_vpi` enabled.

pub mod ffi;
mod probe;
mod values;

/// Cargo.toml version of this library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, thiserror::Error)]
pub enum VpiError {
    #[error("no signal named `{0}` in the simulation hierarchy")]
    SignalNotFound(String),
    #[error("signal names must not contain nul bytes")]
    InvalidName(#[from] std::ffi::NulError),
    #[error("`{name}` carries undefined (x/z) bits: {value}")]
    UndefinedBits { name: String, value: String },
    #[error("`{name}` is {bits} bits wide and does not fit into 64 bits")]
    TooWide { name: String, bits: u32 },
    #[error("`{name}` returned a value string that cannot be parsed: `{value}`")]
    MalformedValue { name: String, value: String },
    #[error("value string from the simulator is not valid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("simulator reported: {0}")]
    Simulator(String),
}

pub type Result<T> = std::result::Result<T, VpiError>;

pub use probe::{read_integer, read_u64, Probe, SignalHandle, VarInfo};
pub use values::{ScalarValue, ValueFormat, VarType};
