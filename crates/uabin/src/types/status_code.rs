// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! OPC UA status codes.
//!
//! A status code is a 32-bit value: the top two bits carry the severity
//! (`00` good, `01` uncertain, `10` bad), bits 16..30 the sub-code and the low
//! 16 bits informational flags. Every fallible operation of this crate
//! propagates a `StatusCode` as its error.

use std::fmt;

/// Result alias used throughout the crate.
pub type UaResult<T> = Result<T, StatusCode>;

/// A namespace-zero status code.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct StatusCode(pub u32);

const SEVERITY_MASK: u32 = 0xC000_0000;
const CODE_MASK: u32 = 0xFFFF_0000;

macro_rules! status_codes {
    ($($konst:ident = $value:literal => $text:literal;)*) => {
        impl StatusCode {
            $(
                #[doc = $text]
                pub const $konst: StatusCode = StatusCode($value);
            )*

            /// Symbolic name of the code, ignoring informational bits.
            pub fn name(&self) -> &'static str {
                match self.0 & CODE_MASK {
                    $($value => $text,)*
                    _ => "Unknown",
                }
            }
        }
    };
}

status_codes! {
    GOOD = 0x0000_0000 => "Good";
    GOOD_COMPLETES_ASYNCHRONOUSLY = 0x002E_0000 => "GoodCompletesAsynchronously";
    UNCERTAIN = 0x4000_0000 => "Uncertain";
    BAD = 0x8000_0000 => "Bad";
    BAD_UNEXPECTED_ERROR = 0x8001_0000 => "BadUnexpectedError";
    BAD_INTERNAL_ERROR = 0x8002_0000 => "BadInternalError";
    BAD_OUT_OF_MEMORY = 0x8003_0000 => "BadOutOfMemory";
    BAD_RESOURCE_UNAVAILABLE = 0x8004_0000 => "BadResourceUnavailable";
    BAD_COMMUNICATION_ERROR = 0x8005_0000 => "BadCommunicationError";
    BAD_ENCODING_ERROR = 0x8006_0000 => "BadEncodingError";
    BAD_DECODING_ERROR = 0x8007_0000 => "BadDecodingError";
    BAD_ENCODING_LIMITS_EXCEEDED = 0x8008_0000 => "BadEncodingLimitsExceeded";
    BAD_UNKNOWN_RESPONSE = 0x8009_0000 => "BadUnknownResponse";
    BAD_TIMEOUT = 0x800A_0000 => "BadTimeout";
    BAD_SERVICE_UNSUPPORTED = 0x800B_0000 => "BadServiceUnsupported";
    BAD_SHUTDOWN = 0x800C_0000 => "BadShutdown";
    BAD_SERVER_NOT_CONNECTED = 0x800D_0000 => "BadServerNotConnected";
    BAD_SERVER_HALTED = 0x800E_0000 => "BadServerHalted";
    BAD_NOTHING_TO_DO = 0x800F_0000 => "BadNothingToDo";
    BAD_TOO_MANY_OPERATIONS = 0x8010_0000 => "BadTooManyOperations";
    BAD_DATA_TYPE_ID_UNKNOWN = 0x8011_0000 => "BadDataTypeIdUnknown";
    BAD_SECURITY_CHECKS_FAILED = 0x8013_0000 => "BadSecurityChecksFailed";
    BAD_USER_ACCESS_DENIED = 0x801F_0000 => "BadUserAccessDenied";
    BAD_SESSION_ID_INVALID = 0x8025_0000 => "BadSessionIdInvalid";
    BAD_SESSION_CLOSED = 0x8026_0000 => "BadSessionClosed";
    BAD_SESSION_NOT_ACTIVATED = 0x8027_0000 => "BadSessionNotActivated";
    BAD_SUBSCRIPTION_ID_INVALID = 0x8028_0000 => "BadSubscriptionIdInvalid";
    BAD_REQUEST_HEADER_INVALID = 0x802A_0000 => "BadRequestHeaderInvalid";
    BAD_TIMESTAMPS_TO_RETURN_INVALID = 0x802B_0000 => "BadTimestampsToReturnInvalid";
    BAD_REQUEST_CANCELLED_BY_CLIENT = 0x802C_0000 => "BadRequestCancelledByClient";
    BAD_NODE_ID_INVALID = 0x8033_0000 => "BadNodeIdInvalid";
    BAD_NODE_ID_UNKNOWN = 0x8034_0000 => "BadNodeIdUnknown";
    BAD_ATTRIBUTE_ID_INVALID = 0x8035_0000 => "BadAttributeIdInvalid";
    BAD_INDEX_RANGE_INVALID = 0x8036_0000 => "BadIndexRangeInvalid";
    BAD_INDEX_RANGE_NO_DATA = 0x8037_0000 => "BadIndexRangeNoData";
    BAD_NOT_READABLE = 0x803A_0000 => "BadNotReadable";
    BAD_NOT_WRITABLE = 0x803B_0000 => "BadNotWritable";
    BAD_OUT_OF_RANGE = 0x803C_0000 => "BadOutOfRange";
    BAD_NOT_SUPPORTED = 0x803D_0000 => "BadNotSupported";
    BAD_NOT_FOUND = 0x803E_0000 => "BadNotFound";
    BAD_NOT_IMPLEMENTED = 0x8040_0000 => "BadNotImplemented";
    BAD_NO_MATCH = 0x806F_0000 => "BadNoMatch";
    BAD_TYPE_MISMATCH = 0x8074_0000 => "BadTypeMismatch";
    BAD_METHOD_INVALID = 0x8075_0000 => "BadMethodInvalid";
    BAD_ARGUMENTS_MISSING = 0x8076_0000 => "BadArgumentsMissing";
    BAD_TOO_MANY_SUBSCRIPTIONS = 0x8077_0000 => "BadTooManySubscriptions";
    BAD_INVALID_ARGUMENT = 0x80AB_0000 => "BadInvalidArgument";
    BAD_INVALID_STATE = 0x80AF_0000 => "BadInvalidState";
    BAD_REQUEST_TOO_LARGE = 0x80B8_0000 => "BadRequestTooLarge";
    BAD_RESPONSE_TOO_LARGE = 0x80B9_0000 => "BadResponseTooLarge";
}

impl StatusCode {
    /// Raw 32-bit value.
    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn is_good(&self) -> bool {
        self.0 & SEVERITY_MASK == 0
    }

    pub fn is_uncertain(&self) -> bool {
        self.0 & SEVERITY_MASK == 0x4000_0000
    }

    pub fn is_bad(&self) -> bool {
        self.0 & 0x8000_0000 != 0
    }

    /// Same code with the informational bits stripped.
    pub fn code(&self) -> StatusCode {
        StatusCode(self.0 & CODE_MASK)
    }

    /// Turn a good code into `Ok(())` and anything else into `Err(self)`.
    pub fn into_result(self) -> UaResult<()> {
        if self.is_good() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        if name == "Unknown" || self.0 & !CODE_MASK != 0 {
            write!(f, "{} (0x{:08X})", name, self.0)
        } else {
            f.write_str(name)
        }
    }
}

impl fmt::Debug for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StatusCode({}, 0x{:08X})", self.name(), self.0)
    }
}

impl std::error::Error for StatusCode {}

impl From<u32> for StatusCode {
    fn from(value: u32) -> Self {
        StatusCode(value)
    }
}

impl From<std::collections::TryReserveError> for StatusCode {
    fn from(_: std::collections::TryReserveError) -> Self {
        StatusCode::BAD_OUT_OF_MEMORY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity() {
        assert!(StatusCode::GOOD.is_good());
        assert!(StatusCode::GOOD_COMPLETES_ASYNCHRONOUSLY.is_good());
        assert!(StatusCode::UNCERTAIN.is_uncertain());
        assert!(StatusCode::BAD_DECODING_ERROR.is_bad());
        assert!(!StatusCode::BAD_DECODING_ERROR.is_good());
    }

    #[test]
    fn test_name_ignores_info_bits() {
        let code = StatusCode(StatusCode::BAD_NODE_ID_UNKNOWN.0 | 0x0400);
        assert_eq!(code.name(), "BadNodeIdUnknown");
        assert_eq!(code.code(), StatusCode::BAD_NODE_ID_UNKNOWN);
        assert_eq!(format!("{}", code), "BadNodeIdUnknown (0x80340400)");
    }

    #[test]
    fn test_display_unknown() {
        assert_eq!(format!("{}", StatusCode(0x8FFF_0000)), "Unknown (0x8FFF0000)");
        assert_eq!(format!("{}", StatusCode::BAD_OUT_OF_MEMORY), "BadOutOfMemory");
    }

    #[test]
    fn test_into_result() {
        assert!(StatusCode::GOOD.into_result().is_ok());
        assert_eq!(
            StatusCode::BAD_TIMEOUT.into_result(),
            Err(StatusCode::BAD_TIMEOUT)
        );
    }
}
