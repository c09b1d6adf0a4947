//! Error type
//!
//! Every error in this crate is local, synchronous and non-fatal. The
//! caller decides whether to re-issue the request; a stop request is the
//! universal reset.

use core::fmt;

/// Result alias used throughout the crate
pub type Result<T> = core::result::Result<T, Error>;

/// Errors reported to the requester
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Error {
    /// Malformed trigger value, wrong length, or illegal symbol
    InvalidArgument,
    /// A session is in flight; the request would disturb it
    Busy,
    /// The output line driver reported a failure
    Line,
}

impl Error {
    /// Negative errno value, as reported by a sysfs-style attribute store
    #[must_use]
    pub const fn errno(self) -> i32 {
        match self {
            Self::InvalidArgument => -22,
            Self::Busy => -16,
            Self::Line => -5,
        }
    }

    /// Short lowercase description
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid argument",
            Self::Busy => "device busy",
            Self::Line => "line i/o error",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "embedded")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::InvalidArgument => defmt::write!(f, "EINVAL"),
            Self::Busy => defmt::write!(f, "EBUSY"),
            Self::Line => defmt::write!(f, "EIO"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errno_values() {
        assert_eq!(Error::InvalidArgument.errno(), -22);
        assert_eq!(Error::Busy.errno(), -16);
        assert_eq!(Error::Line.errno(), -5);
    }

    #[test]
    fn display_matches_as_str() {
        extern crate std;
        use std::string::ToString;

        assert_eq!(Error::Busy.to_string(), "device busy");
        assert_eq!(Error::InvalidArgument.to_string(), Error::InvalidArgument.as_str());
    }
}
