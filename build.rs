// Copyright 2023-2024 The Regents of the University of California
// Copyright 2024-2025 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

fn main() {
    // The vpi_* symbols are provided by the simulator process that loads the
    // final artifact, e.g., Verilator with verilated_vpi linked in. Test
    // binaries run outside of a simulator and never call into the FFI layer,
    // so they are allowed to link with those symbols unresolved.
    //
    // `rustc-link-arg-tests` only covers integration test targets and cargo
    // rejects it when none exist; this crate has unit tests only, so use the
    // general form, which is a no-op for the rlib and applies when cargo
    // links the unit test binary.
    println!("cargo:rustc-link-arg=-Wl,--unresolved-symbols=ignore-all");
}
