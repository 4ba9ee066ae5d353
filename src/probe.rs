// Copyright 2023-2024 The Regents of the University of California
// Copyright 2024-2025 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>
//
// Safe access layer over the raw VPI calls: checked handle lookup by
// hierarchical name plus typed value reads.

use crate::values::{normalize_bit_string, parse_hex_u64, ScalarValue, ValueFormat, VarType};
use crate::{ffi, Result, VpiError};
use rustc_hash::FxHashMap;
use std::ffi::{CStr, CString};
use std::fmt::{Debug, Formatter};
use std::ptr::NonNull;

/// One-shot read of a signal with the integer value format (`vpiIntVal`).
/// Construct a [`Probe`] instead when reading repeatedly, it caches the
/// handle lookup.
pub fn read_integer(name: &str) -> Result<i32> {
    Probe::connect().get_integer(name)
}

/// One-shot read of a signal of up to 64 bits via its hex string
/// representation (`vpiHexStrVal`). Construct a [`Probe`] instead when
/// reading repeatedly, it caches the handle lookup.
pub fn read_u64(name: &str) -> Result<u64> {
    Probe::connect().get_u64(name)
}

/// A non-null VPI object handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalHandle(NonNull<ffi::PLI_UINT32>);

impl SignalHandle {
    pub(crate) fn from_raw(raw: ffi::vpiHandle) -> Option<Self> {
        NonNull::new(raw).map(Self)
    }

    pub(crate) fn as_raw(&self) -> ffi::vpiHandle {
        self.0.as_ptr()
    }
}

/// Metadata of a signal as reported by the simulator.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub struct VarInfo {
    pub full_name: String,
    pub tpe: VarType,
    pub bits: u32,
}

/// The raw simulator calls behind [`Probe`]. Tests substitute their own
/// implementation for the real [`SimulatorBackend`].
pub(crate) trait VpiBackend {
    fn handle_by_name(&mut self, name: &CStr) -> Result<Option<SignalHandle>>;
    fn get_value_int(&mut self, handle: SignalHandle) -> Result<i32>;
    fn get_value_scalar(&mut self, handle: SignalHandle) -> Result<i32>;
    fn get_value_str(&mut self, handle: SignalHandle, format: ValueFormat) -> Result<String>;
    fn get_property(&mut self, handle: SignalHandle, property: ffi::PLI_INT32) -> Result<i32>;
    fn get_str_property(&mut self, handle: SignalHandle, property: ffi::PLI_INT32)
        -> Result<String>;
    fn release(&mut self, handle: SignalHandle);
}

/// Production backend calling into the simulator that loaded us.
struct SimulatorBackend;

impl SimulatorBackend {
    /// Turns a pending simulator error into a `Result`. Notices and warnings
    /// are left to the simulator's own output.
    fn check_error(&self) -> Result<()> {
        let mut info = ffi::s_vpi_error_info {
            state: 0,
            level: 0,
            message: std::ptr::null_mut(),
            product: std::ptr::null_mut(),
            code: std::ptr::null_mut(),
            file: std::ptr::null_mut(),
            line: 0,
        };
        let level = unsafe { ffi::vpi_chk_error(&mut info) };
        if level >= ffi::vpiError {
            let message = if info.message.is_null() {
                format!("severity {level} error without a message")
            } else {
                unsafe { CStr::from_ptr(info.message) }
                    .to_string_lossy()
                    .into_owned()
            };
            return Err(VpiError::Simulator(message));
        }
        Ok(())
    }
}

impl VpiBackend for SimulatorBackend {
    fn handle_by_name(&mut self, name: &CStr) -> Result<Option<SignalHandle>> {
        let raw = unsafe {
            ffi::vpi_handle_by_name(name.as_ptr() as *mut ffi::PLI_BYTE8, std::ptr::null_mut())
        };
        self.check_error()?;
        Ok(SignalHandle::from_raw(raw))
    }

    fn get_value_int(&mut self, handle: SignalHandle) -> Result<i32> {
        let mut value = ffi::s_vpi_value {
            format: ffi::vpiIntVal,
            value: ffi::vpi_value_union { integer: 0 },
        };
        unsafe { ffi::vpi_get_value(handle.as_raw(), &mut value) };
        self.check_error()?;
        Ok(unsafe { value.value.integer })
    }

    fn get_value_scalar(&mut self, handle: SignalHandle) -> Result<i32> {
        let mut value = ffi::s_vpi_value {
            format: ffi::vpiScalarVal,
            value: ffi::vpi_value_union { scalar: 0 },
        };
        unsafe { ffi::vpi_get_value(handle.as_raw(), &mut value) };
        self.check_error()?;
        Ok(unsafe { value.value.scalar })
    }

    fn get_value_str(&mut self, handle: SignalHandle, format: ValueFormat) -> Result<String> {
        let mut value = ffi::s_vpi_value {
            format: format.into(),
            value: ffi::vpi_value_union {
                str_: std::ptr::null_mut(),
            },
        };
        unsafe { ffi::vpi_get_value(handle.as_raw(), &mut value) };
        self.check_error()?;
        let ptr = unsafe { value.value.str_ };
        if ptr.is_null() {
            return Err(VpiError::Simulator(format!(
                "vpi_get_value returned no string data for format {format:?}"
            )));
        }
        // the simulator reuses the string buffer, copy it out before the
        // next VPI call
        let copy = unsafe { CStr::from_ptr(ptr) }.to_str()?.to_string();
        Ok(copy)
    }

    fn get_property(&mut self, handle: SignalHandle, property: ffi::PLI_INT32) -> Result<i32> {
        let value = unsafe { ffi::vpi_get(property, handle.as_raw()) };
        self.check_error()?;
        Ok(value)
    }

    fn get_str_property(
        &mut self,
        handle: SignalHandle,
        property: ffi::PLI_INT32,
    ) -> Result<String> {
        let ptr = unsafe { ffi::vpi_get_str(property, handle.as_raw()) };
        self.check_error()?;
        if ptr.is_null() {
            return Err(VpiError::Simulator(format!(
                "vpi_get_str returned no data for property {property}"
            )));
        }
        let copy = unsafe { CStr::from_ptr(ptr) }.to_str()?.to_string();
        Ok(copy)
    }

    fn release(&mut self, handle: SignalHandle) {
        unsafe { ffi::vpi_release_handle(handle.as_raw()) };
    }
}

/// Reads signal values from the running simulation by hierarchical name.
///
/// Handles are cached since we expect the same small set of signals to be
/// read over and over from a co-simulation loop.
pub struct Probe {
    backend: Box<dyn VpiBackend>,
    handles: FxHashMap<String, SignalHandle>,
}

impl Debug for Probe {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Probe({} cached handles)", self.handles.len())
    }
}

impl Probe {
    /// Connects to the simulator that loaded this library. Only meaningful
    /// inside a VPI-capable simulator process.
    pub fn connect() -> Self {
        Self::with_backend(Box::new(SimulatorBackend))
    }

    pub(crate) fn with_backend(backend: Box<dyn VpiBackend>) -> Self {
        Probe {
            backend,
            handles: FxHashMap::default(),
        }
    }

    /// Looks up a signal by its full hierarchical name, e.g.,
    /// `TOP.soc.core.pc`. A null handle from the simulator turns into
    /// [`VpiError::SignalNotFound`].
    pub fn signal(&mut self, name: &str) -> Result<SignalHandle> {
        if let Some(handle) = self.handles.get(name) {
            return Ok(*handle);
        }
        let c_name = CString::new(name)?;
        match self.backend.handle_by_name(&c_name)? {
            Some(handle) => {
                self.handles.insert(name.to_string(), handle);
                Ok(handle)
            }
            None => Err(VpiError::SignalNotFound(name.to_string())),
        }
    }

    /// Reads a signal with the integer value format (`vpiIntVal`). The
    /// simulator truncates wider signals to their lowest 32 bits.
    pub fn get_integer(&mut self, name: &str) -> Result<i32> {
        let handle = self.signal(name)?;
        self.backend.get_value_int(handle)
    }

    /// Reads a signal of up to 64 bits via its hex string representation
    /// (`vpiHexStrVal`). Undefined (x/z) bits are an error.
    pub fn get_u64(&mut self, name: &str) -> Result<u64> {
        let handle = self.signal(name)?;
        let bits = self.backend.get_property(handle, ffi::vpiSize)?;
        if bits > 64 {
            return Err(VpiError::TooWide {
                name: name.to_string(),
                bits: bits as u32,
            });
        }
        let value = self.backend.get_value_str(handle, ValueFormat::HexStr)?;
        parse_hex_u64(name, &value)
    }

    /// Reads a single bit signal as a four-state scalar (`vpiScalarVal`).
    pub fn get_scalar(&mut self, name: &str) -> Result<ScalarValue> {
        let handle = self.signal(name)?;
        let code = self.backend.get_value_scalar(handle)?;
        ScalarValue::try_from(code)
            .map_err(|_| VpiError::Simulator(format!("unexpected scalar value code {code}")))
    }

    /// Reads a signal of any width as a `0`/`1`/`x`/`z` bit string
    /// (`vpiBinStrVal`), msb first.
    pub fn get_bit_string(&mut self, name: &str) -> Result<String> {
        let handle = self.signal(name)?;
        let value = self.backend.get_value_str(handle, ValueFormat::BinStr)?;
        normalize_bit_string(name, &value)
    }

    /// Reads a signal with the string value format (`vpiStringVal`), i.e.,
    /// 8 bits per character.
    pub fn get_string(&mut self, name: &str) -> Result<String> {
        let handle = self.signal(name)?;
        self.backend.get_value_str(handle, ValueFormat::String)
    }

    /// Queries name, type and width of a signal.
    pub fn var_info(&mut self, name: &str) -> Result<VarInfo> {
        let handle = self.signal(name)?;
        let full_name = self.backend.get_str_property(handle, ffi::vpiFullName)?;
        let tpe = VarType::from_code(self.backend.get_property(handle, ffi::vpiType)?);
        let bits = self.backend.get_property(handle, ffi::vpiSize)? as u32;
        Ok(VarInfo {
            full_name,
            tpe,
            bits,
        })
    }

    /// Drops the cached handle for `name` and releases it in the simulator.
    pub fn forget(&mut self, name: &str) {
        if let Some(handle) = self.handles.remove(name) {
            self.backend.release(handle);
        }
    }
}

impl Drop for Probe {
    fn drop(&mut self) {
        for (_, handle) in self.handles.drain() {
            self.backend.release(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone)]
    struct MockSignal {
        name: String,
        tpe: VarType,
        bits: u32,
        value: u64,
        /// overrides the generated string for hex / bin / string reads
        str_value: Option<String>,
    }

    impl MockSignal {
        fn new(name: &str, tpe: VarType, bits: u32, value: u64) -> Self {
            MockSignal {
                name: name.to_string(),
                tpe,
                bits,
                value,
                str_value: None,
            }
        }

        fn with_str(mut self, value: &str) -> Self {
            self.str_value = Some(value.to_string());
            self
        }
    }

    #[derive(Default)]
    struct MockState {
        signals: Vec<MockSignal>,
        lookups: usize,
        released: Vec<usize>,
    }

    struct MockBackend(Rc<RefCell<MockState>>);

    fn handle_for(index: usize) -> SignalHandle {
        SignalHandle::from_raw((index + 1) as ffi::vpiHandle).unwrap()
    }

    fn index_of(handle: SignalHandle) -> usize {
        handle.as_raw() as usize - 1
    }

    impl VpiBackend for MockBackend {
        fn handle_by_name(&mut self, name: &CStr) -> Result<Option<SignalHandle>> {
            let mut state = self.0.borrow_mut();
            state.lookups += 1;
            let name = name.to_str().unwrap();
            Ok(state
                .signals
                .iter()
                .position(|s| s.name == name)
                .map(handle_for))
        }

        fn get_value_int(&mut self, handle: SignalHandle) -> Result<i32> {
            let state = self.0.borrow();
            Ok(state.signals[index_of(handle)].value as i32)
        }

        fn get_value_scalar(&mut self, handle: SignalHandle) -> Result<i32> {
            let state = self.0.borrow();
            Ok(state.signals[index_of(handle)].value as i32)
        }

        fn get_value_str(&mut self, handle: SignalHandle, format: ValueFormat) -> Result<String> {
            let state = self.0.borrow();
            let signal = &state.signals[index_of(handle)];
            if let Some(value) = &signal.str_value {
                return Ok(value.clone());
            }
            let out = match format {
                ValueFormat::HexStr => format!("{:x}", signal.value),
                ValueFormat::BinStr => {
                    format!("{:0width$b}", signal.value, width = signal.bits as usize)
                }
                other => panic!("mock cannot generate {other:?}"),
            };
            Ok(out)
        }

        fn get_property(&mut self, handle: SignalHandle, property: ffi::PLI_INT32) -> Result<i32> {
            let state = self.0.borrow();
            let signal = &state.signals[index_of(handle)];
            match property {
                ffi::vpiSize => Ok(signal.bits as i32),
                ffi::vpiType => Ok(signal.tpe.into()),
                other => panic!("mock cannot answer property {other}"),
            }
        }

        fn get_str_property(
            &mut self,
            handle: SignalHandle,
            property: ffi::PLI_INT32,
        ) -> Result<String> {
            assert_eq!(property, ffi::vpiFullName);
            let state = self.0.borrow();
            Ok(state.signals[index_of(handle)].name.clone())
        }

        fn release(&mut self, handle: SignalHandle) {
            self.0.borrow_mut().released.push(index_of(handle));
        }
    }

    fn mock_probe(signals: Vec<MockSignal>) -> (Probe, Rc<RefCell<MockState>>) {
        let state = Rc::new(RefCell::new(MockState {
            signals,
            ..MockState::default()
        }));
        let probe = Probe::with_backend(Box::new(MockBackend(state.clone())));
        (probe, state)
    }

    #[test]
    fn test_get_integer() {
        let (mut probe, _) = mock_probe(vec![MockSignal::new(
            "TOP.soc.cycles",
            VarType::IntegerVar,
            32,
            12345,
        )]);
        assert_eq!(probe.get_integer("TOP.soc.cycles").unwrap(), 12345);
        assert!(matches!(
            probe.get_integer("TOP.soc.does_not_exist"),
            Err(VpiError::SignalNotFound(_))
        ));
    }

    #[test]
    fn test_handle_cache() {
        let (mut probe, state) = mock_probe(vec![MockSignal::new(
            "TOP.core.pc",
            VarType::Reg,
            32,
            0x8000_0000,
        )]);
        probe.get_integer("TOP.core.pc").unwrap();
        probe.get_integer("TOP.core.pc").unwrap();
        probe.get_u64("TOP.core.pc").unwrap();
        assert_eq!(state.borrow().lookups, 1);
    }

    #[test]
    fn test_get_u64() {
        let (mut probe, _) = mock_probe(vec![
            MockSignal::new("TOP.mem.addr", VarType::Reg, 64, 0xdead_beef_cafe_f00d),
            MockSignal::new("TOP.mem.len", VarType::Net, 8, 17),
        ]);
        assert_eq!(
            probe.get_u64("TOP.mem.addr").unwrap(),
            0xdead_beef_cafe_f00d
        );
        assert_eq!(probe.get_u64("TOP.mem.len").unwrap(), 17);
    }

    #[test]
    fn test_get_u64_rejects_wide_signals() {
        let (mut probe, _) = mock_probe(vec![MockSignal::new(
            "TOP.mem.line",
            VarType::Reg,
            128,
            0,
        )]);
        assert!(matches!(
            probe.get_u64("TOP.mem.line"),
            Err(VpiError::TooWide { bits: 128, .. })
        ));
    }

    #[test]
    fn test_get_u64_rejects_undefined_bits() {
        let (mut probe, _) = mock_probe(vec![
            MockSignal::new("TOP.bus.rdata", VarType::Net, 32, 0).with_str("xxxxxxxx")
        ]);
        assert!(matches!(
            probe.get_u64("TOP.bus.rdata"),
            Err(VpiError::UndefinedBits { .. })
        ));
    }

    #[test]
    fn test_get_scalar() {
        let (mut probe, _) = mock_probe(vec![
            MockSignal::new("TOP.clk", VarType::Net, 1, 1),
            MockSignal::new("TOP.reset", VarType::Net, 1, ffi::vpiX as u64),
        ]);
        assert_eq!(probe.get_scalar("TOP.clk").unwrap(), ScalarValue::One);
        assert_eq!(
            probe.get_scalar("TOP.reset").unwrap(),
            ScalarValue::Undefined
        );
    }

    #[test]
    fn test_get_bit_string() {
        let (mut probe, _) = mock_probe(vec![
            MockSignal::new("TOP.state", VarType::Reg, 4, 0b1010),
            MockSignal::new("TOP.tri", VarType::Net, 4, 0).with_str("1XZ0"),
        ]);
        assert_eq!(probe.get_bit_string("TOP.state").unwrap(), "1010");
        assert_eq!(probe.get_bit_string("TOP.tri").unwrap(), "1xz0");
    }

    #[test]
    fn test_get_string() {
        let (mut probe, _) = mock_probe(vec![
            MockSignal::new("TOP.magic", VarType::Reg, 32, 0).with_str("niao")
        ]);
        assert_eq!(probe.get_string("TOP.magic").unwrap(), "niao");
    }

    #[test]
    fn test_var_info() {
        let (mut probe, _) = mock_probe(vec![MockSignal::new(
            "TOP.core.pc",
            VarType::Reg,
            64,
            0,
        )]);
        assert_eq!(
            probe.var_info("TOP.core.pc").unwrap(),
            VarInfo {
                full_name: "TOP.core.pc".to_string(),
                tpe: VarType::Reg,
                bits: 64,
            }
        );
    }

    #[test]
    fn test_invalid_name() {
        let (mut probe, _) = mock_probe(vec![]);
        assert!(matches!(
            probe.get_integer("TOP.\0oops"),
            Err(VpiError::InvalidName(_))
        ));
    }

    #[test]
    fn test_forget_releases_handle() {
        let (mut probe, state) = mock_probe(vec![MockSignal::new(
            "TOP.core.pc",
            VarType::Reg,
            32,
            0,
        )]);
        probe.get_integer("TOP.core.pc").unwrap();
        probe.forget("TOP.core.pc");
        assert_eq!(state.borrow().released, vec![0]);
        // a released signal needs a fresh lookup
        probe.get_integer("TOP.core.pc").unwrap();
        assert_eq!(state.borrow().lookups, 2);
    }

    #[test]
    fn test_drop_releases_cached_handles() {
        let (mut probe, state) = mock_probe(vec![
            MockSignal::new("TOP.a", VarType::Net, 1, 0),
            MockSignal::new("TOP.b", VarType::Net, 1, 1),
        ]);
        probe.get_integer("TOP.a").unwrap();
        probe.get_integer("TOP.b").unwrap();
        drop(probe);
        let mut released = state.borrow().released.clone();
        released.sort_unstable();
        assert_eq!(released, vec![0, 1]);
    }
}
