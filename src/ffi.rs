// Copyright 2023-2024 The Regents of the University of California
// Copyright 2024-2025 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>
//
// Hand-written bindings for the subset of IEEE 1800 `vpi_user.h` that this
// crate consumes. Names and values follow the standard header so that code
// which already knows the C API reads naturally.

#![allow(non_camel_case_types, non_upper_case_globals, non_snake_case)]

use std::ffi::c_char;

pub type PLI_INT32 = i32;
pub type PLI_UINT32 = u32;
pub type PLI_BYTE8 = c_char;

/// Opaque object handle. The standard defines it as a pointer to an
/// unspecified word, simulators hand out pointers into their own object
/// tables.
pub type vpiHandle = *mut PLI_UINT32;

// value formats (s_vpi_value.format)
pub const vpiBinStrVal: PLI_INT32 = 1;
pub const vpiOctStrVal: PLI_INT32 = 2;
pub const vpiDecStrVal: PLI_INT32 = 3;
pub const vpiHexStrVal: PLI_INT32 = 4;
pub const vpiScalarVal: PLI_INT32 = 5;
pub const vpiIntVal: PLI_INT32 = 6;
pub const vpiRealVal: PLI_INT32 = 7;
pub const vpiStringVal: PLI_INT32 = 8;
pub const vpiVectorVal: PLI_INT32 = 9;
pub const vpiStrengthVal: PLI_INT32 = 10;
pub const vpiTimeVal: PLI_INT32 = 11;
pub const vpiObjTypeVal: PLI_INT32 = 12;
pub const vpiSuppressVal: PLI_INT32 = 13;

// scalar values (s_vpi_value.value.scalar)
pub const vpi0: PLI_INT32 = 0;
pub const vpi1: PLI_INT32 = 1;
pub const vpiZ: PLI_INT32 = 2;
pub const vpiX: PLI_INT32 = 3;
pub const vpiH: PLI_INT32 = 4;
pub const vpiL: PLI_INT32 = 5;
pub const vpiDontCare: PLI_INT32 = 6;

// integer properties for vpi_get / vpi_get_str
pub const vpiUndefined: PLI_INT32 = -1;
pub const vpiType: PLI_INT32 = 1;
pub const vpiName: PLI_INT32 = 2;
pub const vpiFullName: PLI_INT32 = 3;
pub const vpiSize: PLI_INT32 = 4;
pub const vpiFile: PLI_INT32 = 5;
pub const vpiLineNo: PLI_INT32 = 6;

// object type codes returned by vpi_get(vpiType, ..); only the codes a
// simulator reports for value-carrying objects are listed
pub const vpiConstant: PLI_INT32 = 7;
pub const vpiIntegerVar: PLI_INT32 = 25;
pub const vpiMemory: PLI_INT32 = 29;
pub const vpiMemoryWord: PLI_INT32 = 30;
pub const vpiModule: PLI_INT32 = 32;
pub const vpiNamedEvent: PLI_INT32 = 34;
pub const vpiNet: PLI_INT32 = 36;
pub const vpiNetBit: PLI_INT32 = 37;
pub const vpiParameter: PLI_INT32 = 41;
pub const vpiPort: PLI_INT32 = 44;
pub const vpiRealVar: PLI_INT32 = 47;
pub const vpiReg: PLI_INT32 = 48;
pub const vpiRegBit: PLI_INT32 = 49;
pub const vpiTimeVar: PLI_INT32 = 63;

// error severity levels (s_vpi_error_info.level)
pub const vpiNotice: PLI_INT32 = 1;
pub const vpiWarning: PLI_INT32 = 2;
pub const vpiError: PLI_INT32 = 3;
pub const vpiSystem: PLI_INT32 = 4;
pub const vpiInternal: PLI_INT32 = 5;

// time types (s_vpi_time.tpe)
pub const vpiScaledRealTime: PLI_INT32 = 1;
pub const vpiSimTime: PLI_INT32 = 2;
pub const vpiSuppressTime: PLI_INT32 = 3;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct s_vpi_time {
    pub tpe: PLI_INT32,
    pub high: PLI_UINT32,
    pub low: PLI_UINT32,
    pub real: f64,
}

/// One 32-bit chunk of a four-state vector: `aval` carries the low bit of
/// each digit, `bval` the high bit (00 = `0`, 01 = `1`, 10 = `z`, 11 = `x`).
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct s_vpi_vecval {
    pub aval: PLI_UINT32,
    pub bval: PLI_UINT32,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub union vpi_value_union {
    pub str_: *mut PLI_BYTE8,
    pub scalar: PLI_INT32,
    pub integer: PLI_INT32,
    pub real: f64,
    pub time: *mut s_vpi_time,
    pub vector: *mut s_vpi_vecval,
    pub strength: PLI_INT32,
    pub misc: *mut PLI_BYTE8,
}

/// Value exchange struct for `vpi_get_value`. The caller sets `format`, the
/// simulator fills in `value`. String and vector payloads point into buffers
/// owned by the simulator which are only valid until the next VPI call.
#[repr(C)]
pub struct s_vpi_value {
    pub format: PLI_INT32,
    pub value: vpi_value_union,
}

#[repr(C)]
pub struct s_vpi_error_info {
    pub state: PLI_INT32,
    pub level: PLI_INT32,
    pub message: *mut PLI_BYTE8,
    pub product: *mut PLI_BYTE8,
    pub code: *mut PLI_BYTE8,
    pub file: *mut PLI_BYTE8,
    pub line: PLI_INT32,
}

extern "C" {
    pub fn vpi_handle_by_name(name: *mut PLI_BYTE8, scope: vpiHandle) -> vpiHandle;
    pub fn vpi_get_value(object: vpiHandle, value_p: *mut s_vpi_value);
    pub fn vpi_get(property: PLI_INT32, object: vpiHandle) -> PLI_INT32;
    pub fn vpi_get_str(property: PLI_INT32, object: vpiHandle) -> *mut PLI_BYTE8;
    pub fn vpi_chk_error(error_info_p: *mut s_vpi_error_info) -> PLI_INT32;
    pub fn vpi_release_handle(object: vpiHandle) -> PLI_INT32;
}
