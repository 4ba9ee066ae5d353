// Copyright 2023-2024 The Regents of the University of California
// Copyright 2024-2025 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>
//
// Typed views of the VPI value formats and the parsing of simulator value
// strings into Rust integers.

use crate::{Result, VpiError};
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Value formats that can be requested through `vpi_get_value`. Discriminants
/// are the `vpi*Val` constants from `vpi_user.h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(i32)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueFormat {
    BinStr = 1,
    OctStr = 2,
    DecStr = 3,
    HexStr = 4,
    Scalar = 5,
    Int = 6,
    Real = 7,
    String = 8,
    Vector = 9,
}

/// Object types a simulator reports for value-carrying objects through
/// `vpi_get(vpiType, ..)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(i32)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum VarType {
    Unknown = 0,
    Constant = 7,
    IntegerVar = 25,
    Memory = 29,
    MemoryWord = 30,
    Module = 32,
    NamedEvent = 34,
    Net = 36,
    NetBit = 37,
    Parameter = 41,
    Port = 44,
    RealVar = 47,
    Reg = 48,
    RegBit = 49,
    TimeVar = 63,
}

impl VarType {
    /// Simulators are free to report vendor specific type codes, map anything
    /// we do not know to `Unknown` instead of failing the read.
    pub fn from_code(code: i32) -> Self {
        VarType::try_from(code).unwrap_or(VarType::Unknown)
    }
}

/// A single four-state (plus strength) bit as returned by a `vpiScalarVal`
/// read. Discriminants are the `vpi0` .. `vpiDontCare` constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(i32)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub enum ScalarValue {
    Zero = 0,
    One = 1,
    HighImpedance = 2,
    Undefined = 3,
    WeakHigh = 4,
    WeakLow = 5,
    DontCare = 6,
}

impl ScalarValue {
    pub fn to_char(&self) -> char {
        match self {
            ScalarValue::Zero => '0',
            ScalarValue::One => '1',
            ScalarValue::HighImpedance => 'z',
            ScalarValue::Undefined => 'x',
            ScalarValue::WeakHigh => 'h',
            ScalarValue::WeakLow => 'l',
            ScalarValue::DontCare => '-',
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, ScalarValue::Zero | ScalarValue::One)
    }
}

impl std::fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Parses a `vpiHexStrVal` string into a `u64`. Simulators encode undefined
/// bits as `x`/`z` digits in the string, those are rejected instead of being
/// silently read as zero.
pub(crate) fn parse_hex_u64(name: &str, value: &str) -> Result<u64> {
    let trimmed = value.trim_start_matches('0');
    if trimmed.is_empty() {
        return if value.is_empty() {
            Err(malformed(name, value))
        } else {
            Ok(0)
        };
    }
    if trimmed.len() > 16 {
        return Err(VpiError::TooWide {
            name: name.to_string(),
            bits: 4 * value.len() as u32,
        });
    }
    let mut result = 0u64;
    for c in trimmed.chars() {
        let digit = match c {
            '0'..='9' | 'a'..='f' | 'A'..='F' => c.to_digit(16).unwrap() as u64,
            'x' | 'X' | 'z' | 'Z' | '?' => {
                return Err(VpiError::UndefinedBits {
                    name: name.to_string(),
                    value: value.to_string(),
                })
            }
            _ => return Err(malformed(name, value)),
        };
        result = (result << 4) | digit;
    }
    Ok(result)
}

/// Normalizes a `vpiBinStrVal` string to the lowercase `0`/`1`/`x`/`z`
/// vocabulary.
pub(crate) fn normalize_bit_string(name: &str, value: &str) -> Result<String> {
    if value.is_empty() {
        return Err(malformed(name, value));
    }
    value
        .chars()
        .map(|c| match c {
            '0' | '1' | 'x' | 'z' => Ok(c),
            'X' => Ok('x'),
            'Z' => Ok('z'),
            _ => Err(malformed(name, value)),
        })
        .collect()
}

fn malformed(name: &str, value: &str) -> VpiError {
    VpiError::MalformedValue {
        name: name.to_string(),
        value: value.to_string(),
    }
}
