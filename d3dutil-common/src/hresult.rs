use std::fmt;

/// A Windows `HRESULT` status code.
///
/// Negative values are failures. Codes print as zero-padded 8-digit hexadecimal.
#[repr(transparent)]
#[derive(Copy, Clone, Default, Debug, Eq, PartialEq, Hash)]
pub struct HResult(pub i32);

const FACILITY_WIN32: u32 = 7;

const ERROR_FILE_NOT_FOUND: u32 = 2;
const ERROR_PATH_NOT_FOUND: u32 = 3;
const ERROR_ACCESS_DENIED: u32 = 5;
const ERROR_ALREADY_EXISTS: u32 = 183;

impl HResult {
    pub const S_OK: HResult = HResult(0);
    pub const S_FALSE: HResult = HResult(1);
    pub const E_NOTIMPL: HResult = HResult(0x8000_4001_u32 as i32);
    pub const E_FAIL: HResult = HResult(0x8000_4005_u32 as i32);
    pub const E_ACCESSDENIED: HResult = HResult(0x8007_0005_u32 as i32);
    pub const E_OUTOFMEMORY: HResult = HResult(0x8007_000E_u32 as i32);
    pub const E_INVALIDARG: HResult = HResult(0x8007_0057_u32 as i32);

    pub const DXGI_ERROR_INVALID_CALL: HResult = HResult(0x887A_0001_u32 as i32);
    pub const DXGI_ERROR_DEVICE_REMOVED: HResult = HResult(0x887A_0005_u32 as i32);
    pub const DXGI_ERROR_DEVICE_HUNG: HResult = HResult(0x887A_0006_u32 as i32);
    pub const DXGI_ERROR_DEVICE_RESET: HResult = HResult(0x887A_0007_u32 as i32);
    pub const DXGI_ERROR_WAS_STILL_DRAWING: HResult = HResult(0x887A_000A_u32 as i32);

    pub const D3D11_ERROR_TOO_MANY_UNIQUE_STATE_OBJECTS: HResult =
        HResult(0x887C_0001_u32 as i32);
    pub const D3D11_ERROR_FILE_NOT_FOUND: HResult = HResult(0x887C_0002_u32 as i32);

    /// Equivalent of `HRESULT_FROM_WIN32`.
    pub const fn from_win32(code: u32) -> HResult {
        if code as i32 <= 0 {
            HResult(code as i32)
        } else {
            HResult(((code & 0x0000_FFFF) | (FACILITY_WIN32 << 16) | 0x8000_0000) as i32)
        }
    }

    pub const fn is_ok(self) -> bool {
        self.0 >= 0
    }

    pub const fn is_err(self) -> bool {
        !self.is_ok()
    }

    /// The system description of well-known codes, without a line terminator.
    pub fn description(self) -> Option<&'static str> {
        const FILE_NOT_FOUND: HResult = HResult::from_win32(ERROR_FILE_NOT_FOUND);
        const PATH_NOT_FOUND: HResult = HResult::from_win32(ERROR_PATH_NOT_FOUND);
        const ALREADY_EXISTS: HResult = HResult::from_win32(ERROR_ALREADY_EXISTS);

        Some(match self {
            HResult::S_OK => "The operation completed successfully.",
            HResult::S_FALSE => "Incorrect function.",
            HResult::E_NOTIMPL => "Not implemented",
            HResult::E_FAIL => "Unspecified error",
            HResult::E_ACCESSDENIED => "Access is denied.",
            HResult::E_OUTOFMEMORY => "Not enough memory resources are available to complete this operation.",
            HResult::E_INVALIDARG => "The parameter is incorrect.",
            FILE_NOT_FOUND => "The system cannot find the file specified.",
            PATH_NOT_FOUND => "The system cannot find the path specified.",
            ALREADY_EXISTS => "Cannot create a file when that file already exists.",
            HResult::DXGI_ERROR_INVALID_CALL => "The application made a call that is invalid. Either the parameters of the call or the state of some object was incorrect.",
            HResult::DXGI_ERROR_DEVICE_REMOVED => "The GPU device instance has been suspended. Use GetDeviceRemovedReason to determine the appropriate action.",
            HResult::DXGI_ERROR_DEVICE_HUNG => "The GPU will not respond to more commands, most likely because of an invalid command passed by the calling application.",
            HResult::DXGI_ERROR_DEVICE_RESET => "The GPU will not respond to more commands, most likely because some other application submitted invalid commands.",
            HResult::DXGI_ERROR_WAS_STILL_DRAWING => "The GPU was busy at the moment when the call was made, and the call was neither executed nor scheduled.",
            HResult::D3D11_ERROR_TOO_MANY_UNIQUE_STATE_OBJECTS => "There are too many unique instances of a particular type of state object.",
            HResult::D3D11_ERROR_FILE_NOT_FOUND => "The file was not found.",
            _ => return None,
        })
    }
}

impl fmt::Display for HResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0 as u32)
    }
}

impl fmt::LowerHex for HResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&(self.0 as u32), f)
    }
}

impl fmt::UpperHex for HResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&(self.0 as u32), f)
    }
}

impl From<i32> for HResult {
    fn from(value: i32) -> Self {
        HResult(value)
    }
}

impl From<HResult> for i32 {
    fn from(value: HResult) -> Self {
        value.0
    }
}

/// Errors that can be reported as an `HResult`.
pub trait AsHResult {
    fn hresult(&self) -> HResult;
}

impl AsHResult for HResult {
    fn hresult(&self) -> HResult {
        *self
    }
}

impl AsHResult for std::io::Error {
    fn hresult(&self) -> HResult {
        #[cfg(windows)]
        if let Some(code) = self.raw_os_error() {
            return HResult::from_win32(code as u32);
        }

        match self.kind() {
            std::io::ErrorKind::NotFound => HResult::from_win32(ERROR_FILE_NOT_FOUND),
            std::io::ErrorKind::PermissionDenied => HResult::from_win32(ERROR_ACCESS_DENIED),
            std::io::ErrorKind::AlreadyExists => HResult::from_win32(ERROR_ALREADY_EXISTS),
            std::io::ErrorKind::OutOfMemory => HResult::E_OUTOFMEMORY,
            std::io::ErrorKind::InvalidInput => HResult::E_INVALIDARG,
            _ => HResult::E_FAIL,
        }
    }
}
