/*
 *  display/error.rs
 *
 *  lcd5110 - PCD8544 graphics engine
 *  (c) 2020-26 Stuart Hunter
 *
 *  Unified error types for display subsystem
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use thiserror::Error;

/// Failure reported by a wire transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// SPI transfer failed
    #[error("SPI communication error: {0}")]
    Bus(String),

    /// Data/command select line could not be driven
    #[error("D/C line error: {0}")]
    ControlLine(String),

    /// Reset line could not be driven
    #[error("reset line error: {0}")]
    ResetLine(String),
}

/// Unified error type for all display operations
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Request payload shorter than its packed layout
    #[error("payload copy failure: {0}")]
    PayloadCopyFailure(String),

    /// Request code not recognised by the dispatcher
    #[error("unsupported operation code {0:#04x}")]
    UnsupportedOperation(u8),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// SPI device could not be opened or configured
    #[error("SPI error: {0}")]
    SpiError(String),

    /// GPIO chip or line could not be claimed
    #[error("GPIO error: {0}")]
    GpioError(String),

    /// Another thread panicked while holding the display
    #[error("display lock poisoned")]
    LockPoisoned,
}
