/*
 *  display/drivers/mock.rs
 *
 *  lcd5110 - PCD8544 graphics engine
 *  (c) 2020-26 Stuart Hunter
 *
 *  Mock transport for testing and dry runs without hardware
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

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::display::drivers::panel::PanelModel;
use crate::display::error::TransportError;
use crate::display::protocol::{Level, WriteType};
use crate::display::traits::Transport;

/// One thing that happened on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireEvent {
    Control(WriteType),
    Byte(WriteType, u8),
    Reset(Level),
}

/// Mock transport for testing
///
/// This transport simulates the SPI link without requiring hardware. It's useful for:
/// - Unit tests
/// - Integration tests
/// - Dry runs from the command line
///
/// Every event is recorded and every byte is also fed to a [`PanelModel`],
/// so tests can check both the exact traffic and what the panel would show.
/// Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockTransportState>>,
}

/// Internal state for the mock transport (shared for inspection in tests)
#[derive(Debug)]
pub struct MockTransportState {
    /// Wire events in order
    pub events: Vec<WireEvent>,

    /// Emulated controller
    pub panel: PanelModel,

    /// Current D/C line state
    pub control: WriteType,

    /// Bytes clocked out since creation
    pub bytes_sent: usize,

    /// Fail every byte transfer (for error testing)
    pub simulate_failure: bool,

    /// Fail once this many bytes have been sent
    pub fail_after: Option<usize>,
}

impl Default for MockTransportState {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            panel: PanelModel::new(),
            control: WriteType::Command,
            bytes_sent: 0,
            simulate_failure: false,
            fail_after: None,
        }
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockTransportState>> {
        Arc::clone(&self.state)
    }

    // a panicking test thread must not hide the recorded traffic
    fn lock(&self) -> MutexGuard<'_, MockTransportState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn events(&self) -> Vec<WireEvent> {
        self.lock().events.clone()
    }

    /// Forget recorded events; the panel model and byte count are kept
    pub fn clear_events(&self) {
        self.lock().events.clear();
    }

    /// Bytes sent with D/C low, in order
    pub fn commands(&self) -> Vec<u8> {
        self.bytes_of(WriteType::Command)
    }

    /// Bytes sent with D/C high, in order
    pub fn data(&self) -> Vec<u8> {
        self.bytes_of(WriteType::Data)
    }

    fn bytes_of(&self, kind: WriteType) -> Vec<u8> {
        self.lock()
            .events
            .iter()
            .filter_map(|event| match *event {
                WireEvent::Byte(k, b) if k == kind => Some(b),
                _ => None,
            })
            .collect()
    }

    /// Snapshot of the emulated controller
    pub fn panel(&self) -> PanelModel {
        self.lock().panel.clone()
    }

    pub fn bytes_sent(&self) -> usize {
        self.lock().bytes_sent
    }

    pub fn set_simulate_failure(&self, fail: bool) {
        self.lock().simulate_failure = fail;
    }

    /// Let `count` more bytes through, then fail
    pub fn fail_after(&self, count: usize) {
        let mut state = self.lock();
        state.fail_after = Some(state.bytes_sent + count);
    }

    /// Reset state (useful between tests)
    pub fn reset_state(&self) {
        *self.lock() = MockTransportState::default();
    }
}

impl Transport for MockTransport {
    fn set_control_line(&mut self, kind: WriteType) -> Result<(), TransportError> {
        let mut state = self.lock();
        state.control = kind;
        state.events.push(WireEvent::Control(kind));
        Ok(())
    }

    fn transfer_byte(&mut self, byte: u8) -> Result<(), TransportError> {
        let mut state = self.lock();

        if state.simulate_failure {
            return Err(TransportError::Bus("Simulated transfer failure".to_string()));
        }
        if state.fail_after.is_some_and(|limit| state.bytes_sent >= limit) {
            return Err(TransportError::Bus(format!(
                "Simulated transfer failure after {} bytes",
                state.bytes_sent
            )));
        }

        let kind = state.control;
        state.events.push(WireEvent::Byte(kind, byte));
        state.bytes_sent += 1;
        state.panel.feed(kind, byte);
        Ok(())
    }

    fn set_reset_line(&mut self, level: Level) -> Result<(), TransportError> {
        let mut state = self.lock();
        state.events.push(WireEvent::Reset(level));
        if level == Level::Low {
            state.panel.reset();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_transport_records_events() {
        let mut mock = MockTransport::new();
        mock.set_reset_line(Level::Low).unwrap();
        mock.write(WriteType::Command, 0x21).unwrap();
        mock.write(WriteType::Data, 0xAA).unwrap();

        assert_eq!(
            mock.events(),
            vec![
                WireEvent::Reset(Level::Low),
                WireEvent::Control(WriteType::Command),
                WireEvent::Byte(WriteType::Command, 0x21),
                WireEvent::Control(WriteType::Data),
                WireEvent::Byte(WriteType::Data, 0xAA),
            ]
        );
        assert_eq!(mock.commands(), vec![0x21]);
        assert_eq!(mock.data(), vec![0xAA]);
        assert_eq!(mock.bytes_sent(), 2);
    }

    #[test]
    fn test_mock_transport_clones_share_state() {
        let mock = MockTransport::new();
        let mut other = mock.clone();
        other.write(WriteType::Command, 0x20).unwrap();
        assert_eq!(mock.commands(), vec![0x20]);
        assert_eq!(mock.state().lock().unwrap().bytes_sent, 1);
    }

    #[test]
    fn test_mock_transport_failure_injection() {
        let mut mock = MockTransport::new();
        mock.set_simulate_failure(true);
        assert!(mock.transfer_byte(0x00).is_err());
        assert!(mock.events().is_empty());

        mock.set_simulate_failure(false);
        mock.fail_after(2);
        assert!(mock.transfer_byte(1).is_ok());
        assert!(mock.transfer_byte(2).is_ok());
        assert!(matches!(mock.transfer_byte(3), Err(TransportError::Bus(_))));
        assert_eq!(mock.bytes_sent(), 2);
    }

    #[test]
    fn test_mock_transport_feeds_panel() {
        let mut mock = MockTransport::new();
        mock.write_all(WriteType::Command, &[0x20, 0x0C, 0x41, 0x80 | 4]).unwrap();
        mock.write_all(WriteType::Data, &[0x01, 0x02]).unwrap();

        let panel = mock.panel();
        assert_eq!(panel.ram()[84 + 4], 0x01);
        assert_eq!(panel.ram()[84 + 5], 0x02);
    }

    #[test]
    fn test_mock_transport_reset_state() {
        let mut mock = MockTransport::new();
        mock.write(WriteType::Data, 0xFF).unwrap();
        mock.reset_state();
        assert!(mock.events().is_empty());
        assert_eq!(mock.bytes_sent(), 0);
        assert_eq!(mock.panel().ram()[0], 0);
    }
}
