//! # Result codes shared by the mesh node core
//!
//! Every primitive in the core reports failure through the same small
//! taxonomy. Leaf crates return it to their immediate caller and never log or
//! recover on their own.
//!
//! | Kind              | Raised when                                                   |
//! |-------------------|---------------------------------------------------------------|
//! | `InvalidArgument` | a precondition is violated (empty input, bad alignment, ...)  |
//! | `NoDevice`        | no valid state transition, device not ready, lookup failure   |
//! | `NoMemory`        | insufficient space, or a destination buffer that is too small |
//! | `TimedOut`        | a blocking wait exceeded its bound                            |
//! | `NoData`          | a consumer found nothing pending                              |
//! | `AlreadyDone`     | duplicate one-time initialization                             |
//! | `Permission`      | a give-style operation by a caller that may not perform it    |
//!
//! Code that has to cross a C-style boundary can use [`Error::code`] and
//! [`status_code`], which follow newlib's errno numbering.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

/// Operation not permitted.
pub const EPERM: i32 = 1;
/// Out of memory.
pub const ENOMEM: i32 = 12;
/// No such device.
pub const ENODEV: i32 = 19;
/// Invalid argument.
pub const EINVAL: i32 = 22;
/// No data available.
pub const ENODATA: i32 = 61;
/// Connection timed out.
pub const ETIMEDOUT: i32 = 116;
/// Operation already in progress.
pub const EALREADY: i32 = 120;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, thiserror::Error)]
pub enum Error {
    #[error("invalid argument")]
    InvalidArgument,
    #[error("no such device")]
    NoDevice,
    #[error("out of memory")]
    NoMemory,
    #[error("timed out")]
    TimedOut,
    #[error("no data available")]
    NoData,
    #[error("already initialized")]
    AlreadyDone,
    #[error("operation not permitted")]
    Permission,
}

pub type Result<T, E = Error> = core::result::Result<T, E>;

impl Error {
    /// Negative errno-style code for this error.
    #[must_use]
    pub const fn code(self) -> i32 {
        -match self {
            Self::InvalidArgument => EINVAL,
            Self::NoDevice => ENODEV,
            Self::NoMemory => ENOMEM,
            Self::TimedOut => ETIMEDOUT,
            Self::NoData => ENODATA,
            Self::AlreadyDone => EALREADY,
            Self::Permission => EPERM,
        }
    }

    /// Inverse of [`code`](Self::code). Accepts the code with either sign.
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        Some(match code.unsigned_abs() as i32 {
            EINVAL => Self::InvalidArgument,
            ENODEV => Self::NoDevice,
            ENOMEM => Self::NoMemory,
            ETIMEDOUT => Self::TimedOut,
            ENODATA => Self::NoData,
            EALREADY => Self::AlreadyDone,
            EPERM => Self::Permission,
            _ => return None,
        })
    }
}

/// Collapses a result into a C-style status: `0` on success, a negative
/// errno otherwise.
#[must_use]
pub const fn status_code<T>(result: &Result<T>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(e) => e.code(),
    }
}
