use std::error;

pub type Result<T> = std::result::Result<T, DeviceError>;

#[derive(Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// One or multiple parameters were incorrect.
    InvalidInput,
}

#[derive(Debug)]
pub struct DeviceError {
    /// Device name.
    pub device: String,
    /// Error kind.
    pub kind: ErrorKind,
}

impl DeviceError {
    pub(crate) fn invalid_input(device: String) -> Self {
        Self {
            device,
            kind: ErrorKind::InvalidInput,
        }
    }
}

impl std::fmt::Display for DeviceError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::result::Result<(), std::fmt::Error> {
        match &self.kind {
            ErrorKind::InvalidInput => write!(f, "{}: invalid device parameters", self.device),
        }
    }
}

impl error::Error for DeviceError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        None
    }
}
