// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Error type shared by every layer of the codec.
//!
//! Constructors are marked `#[cold]` and `#[track_caller]`: they sit on the
//! failure side of every buffer read and type check, and keeping them out of
//! line lets the success path stay small.

use std::borrow::Cow;

use thiserror::Error;

/// Set `FURY_PANIC_ON_ERROR` at compile time to panic where an error is created.
pub const PANIC_ON_ERROR: bool = option_env!("FURY_PANIC_ON_ERROR").is_some();

#[inline(always)]
pub const fn should_panic_on_error() -> bool {
    PANIC_ON_ERROR
}

/// Error type for Fury serialization and deserialization.
///
/// Always build errors through the static constructor functions
/// (`Error::protocol_error(..)`, `Error::schema_mismatch(..)`, ...) rather
/// than the variants, so `FURY_PANIC_ON_ERROR` can hook creation.
///
/// ```rust
/// use fury_core::error::Error;
///
/// let err = Error::unregistered_type("demo::Point");
/// assert!(matches!(err, Error::UnregisteredType(_)));
/// ```
///
/// For debugging, build with `FURY_PANIC_ON_ERROR=1` and `RUST_BACKTRACE=1`
/// to get a stack trace at the exact point an error is constructed.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A read ran past the written bytes.
    #[error("Buffer out of bound: {0} + {1} > {2}")]
    BufferOutOfBound(usize, usize, usize),

    /// Closed-mode lookup of a type that was never registered.
    #[error("Type is not registered: {0}")]
    UnregisteredType(Cow<'static, str>),

    /// The configured security checker rejected a type.
    #[error("Type is not allowed for serialization: {0}")]
    InsecureType(Cow<'static, str>),

    /// The stream is corrupted or the two ends are out of sync.
    #[error("Protocol error: {0}")]
    Protocol(Cow<'static, str>),

    /// Compatible-mode field type conflict between sender and receiver.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(Cow<'static, str>),

    /// Nesting exceeded the configured maximum depth.
    #[error("{0}")]
    DepthExceed(Cow<'static, str>),

    #[error("Type mismatch: expected = {0}, actual = {1}")]
    TypeMismatch(u32, u32),

    #[error("{0}")]
    InvalidData(Cow<'static, str>),

    #[error("{0}")]
    InvalidRef(Cow<'static, str>),

    #[error("{0}")]
    UnknownEnum(Cow<'static, str>),

    #[error("{0}")]
    TypeError(Cow<'static, str>),

    #[error("{0}")]
    EncodeError(Cow<'static, str>),

    #[error("{0}")]
    Unsupported(Cow<'static, str>),

    #[error("{0}")]
    NotAllowed(Cow<'static, str>),

    #[error("{0}")]
    Unknown(Cow<'static, str>),
}

macro_rules! cold_constructor {
    ($(#[$doc:meta])* $fn_name:ident => $variant:ident) => {
        $(#[$doc])*
        #[inline(always)]
        #[cold]
        #[track_caller]
        pub fn $fn_name<S: Into<Cow<'static, str>>>(s: S) -> Self {
            let err = Error::$variant(s.into());
            if PANIC_ON_ERROR {
                panic!("FURY_PANIC_ON_ERROR: {}", err);
            }
            err
        }
    };
}

impl Error {
    /// Creates a new [`Error::BufferOutOfBound`].
    ///
    /// ```
    /// use fury_core::error::Error;
    ///
    /// let err = Error::buffer_out_of_bound(10, 20, 25);
    /// assert_eq!(err.to_string(), "Buffer out of bound: 10 + 20 > 25");
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn buffer_out_of_bound(offset: usize, length: usize, capacity: usize) -> Self {
        let err = Error::BufferOutOfBound(offset, length, capacity);
        if PANIC_ON_ERROR {
            panic!("FURY_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn type_mismatch(expected: u32, actual: u32) -> Self {
        let err = Error::TypeMismatch(expected, actual);
        if PANIC_ON_ERROR {
            panic!("FURY_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    cold_constructor!(
        /// Creates a new [`Error::UnregisteredType`] naming the missing type.
        unregistered_type => UnregisteredType
    );
    cold_constructor!(
        /// Creates a new [`Error::InsecureType`] naming the rejected type.
        insecure_type => InsecureType
    );
    cold_constructor!(
        /// Creates a new [`Error::Protocol`].
        ///
        /// Protocol errors are never recovered from; the whole call fails.
        protocol_error => Protocol
    );
    cold_constructor!(
        /// Creates a new [`Error::SchemaMismatch`].
        schema_mismatch => SchemaMismatch
    );
    cold_constructor!(
        /// Creates a new [`Error::DepthExceed`].
        depth_exceed => DepthExceed
    );
    cold_constructor!(invalid_data => InvalidData);
    cold_constructor!(invalid_ref => InvalidRef);
    cold_constructor!(unknown_enum => UnknownEnum);
    cold_constructor!(type_error => TypeError);
    cold_constructor!(encode_error => EncodeError);
    cold_constructor!(unsupported => Unsupported);
    cold_constructor!(not_allowed => NotAllowed);
    cold_constructor!(
        /// Creates a new [`Error::Unknown`] from a literal or formatted message.
        unknown => Unknown
    );

    /// Appends the Rust type name to a [`Error::TypeError`] message.
    ///
    /// Other variants are returned unchanged.
    #[inline(never)]
    pub fn enhance_type_error<T: ?Sized + 'static>(err: Error) -> Error {
        if let Error::TypeError(s) = err {
            Error::type_error(format!("{} (type: {})", s, std::any::type_name::<T>()))
        } else {
            err
        }
    }
}

/// Ensures a condition is true; otherwise returns an [`enum@Error`].
///
/// ```
/// use fury_core::ensure;
/// use fury_core::error::Error;
///
/// fn check_value(n: i32) -> Result<(), Error> {
///     ensure!(n > 0, "value must be positive");
///     ensure!(n < 10, Error::invalid_data("value too large"));
///     ensure!(n != 5, "value {} is reserved", n);
///     Ok(())
/// }
/// assert!(check_value(3).is_ok());
/// assert!(check_value(5).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:literal) => {
        if !$cond {
            return Err($crate::error::Error::unknown($msg));
        }
    };
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return Err($crate::error::Error::unknown(format!($fmt, $($arg)*)));
        }
    };
}

/// Returns early with an [`Error::Unknown`].
#[macro_export]
macro_rules! bail {
    ($err:expr) => {
        return Err($crate::error::Error::unknown($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::error::Error::unknown(format!($fmt, $($arg)*)))
    };
}

/// Returns early with an [`Error::NotAllowed`].
///
/// ```
/// use fury_core::not_allowed;
/// use fury_core::error::Error;
///
/// fn check_operation(op: &str) -> Result<(), Error> {
///     not_allowed!("operation {} not allowed", op);
/// }
/// assert!(check_operation("delete").is_err());
/// ```
#[macro_export]
macro_rules! not_allowed {
    ($err:expr) => {
        return Err($crate::error::Error::not_allowed($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::error::Error::not_allowed(format!($fmt, $($arg)*)))
    };
}
