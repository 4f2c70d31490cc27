/*
 *  display/drivers/spi.rs
 *
 *  lcd5110 - PCD8544 graphics engine
 *  (c) 2020-26 Stuart Hunter
 *
 *  SPI transport over embedded-hal 1.0 with Linux spidev/gpio-cdev binding
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

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;

use crate::display::error::TransportError;
use crate::display::protocol::{Level, WriteType};
use crate::display::traits::Transport;

/// RES must be held low for at least 100ns; 1ms is comfortably over
const RESET_PULSE_MS: u32 = 1;

/// SPI transport for the PCD8544
///
/// Chip enable is handled by the `SpiDevice`, so each transfer asserts SCE
/// around its bytes. D/C and RES are plain output pins.
pub struct SpiTransport<SPI, DC, RST, D> {
    spi: SPI,
    dc: DC,
    rst: RST,
    delay: D,
}

impl<SPI, DC, RST, D> SpiTransport<SPI, DC, RST, D>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    D: DelayNs,
{
    pub fn new(spi: SPI, dc: DC, rst: RST, delay: D) -> Self {
        Self { spi, dc, rst, delay }
    }

    /// Give the bus and pins back
    pub fn release(self) -> (SPI, DC, RST, D) {
        (self.spi, self.dc, self.rst, self.delay)
    }
}

impl<SPI, DC, RST, D> Transport for SpiTransport<SPI, DC, RST, D>
where
    SPI: SpiDevice + Send,
    DC: OutputPin + Send,
    RST: OutputPin + Send,
    D: DelayNs + Send,
{
    fn set_control_line(&mut self, kind: WriteType) -> Result<(), TransportError> {
        let result = match kind {
            WriteType::Command => self.dc.set_low(),
            WriteType::Data => self.dc.set_high(),
        };
        result.map_err(|e| TransportError::ControlLine(format!("{:?}", e)))
    }

    fn transfer_byte(&mut self, byte: u8) -> Result<(), TransportError> {
        self.spi
            .write(&[byte])
            .map_err(|e| TransportError::Bus(format!("{:?}", e)))
    }

    // one SPI transaction for the whole run
    fn write_all(&mut self, kind: WriteType, bytes: &[u8]) -> Result<(), TransportError> {
        self.set_control_line(kind)?;
        self.spi
            .write(bytes)
            .map_err(|e| TransportError::Bus(format!("{:?}", e)))
    }

    fn set_reset_line(&mut self, level: Level) -> Result<(), TransportError> {
        let result = match level {
            Level::Low => self.rst.set_low(),
            Level::High => self.rst.set_high(),
        };
        result.map_err(|e| TransportError::ResetLine(format!("{:?}", e)))?;
        self.delay.delay_ms(RESET_PULSE_MS);
        Ok(())
    }
}

#[cfg(feature = "hardware")]
pub use linux::{open_linux, LinuxSpiTransport};

#[cfg(feature = "hardware")]
mod linux {
    use linux_embedded_hal::gpio_cdev::{Chip, LineRequestFlags};
    use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
    use linux_embedded_hal::{CdevPin, Delay, SpidevDevice};
    use log::info;

    use super::SpiTransport;
    use crate::config::BusConfig;
    use crate::display::error::DisplayError;

    pub type LinuxSpiTransport = SpiTransport<SpidevDevice, CdevPin, CdevPin, Delay>;

    /// Default SPI clock; the PCD8544 is rated to 4MHz
    pub const DEFAULT_SPI_SPEED_HZ: u32 = 4_000_000;
    pub const DEFAULT_GPIO_CHIP: &str = "/dev/gpiochip0";

    /// Open the spidev bus and claim D/C and RES from a gpio character device
    pub fn open_linux(bus: &BusConfig) -> Result<LinuxSpiTransport, DisplayError> {
        let speed_hz = bus.speed_hz.unwrap_or(DEFAULT_SPI_SPEED_HZ);
        let chip_path = bus.gpio_chip.as_deref().unwrap_or(DEFAULT_GPIO_CHIP);

        info!(
            "Opening PCD8544 on {} at {}Hz, D/C line {} and RST line {} on {}",
            bus.bus, speed_hz, bus.dc_pin, bus.rst_pin, chip_path
        );

        let mut spi = SpidevDevice::open(&bus.bus)
            .map_err(|e| DisplayError::SpiError(format!("opening {}: {}", bus.bus, e)))?;
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(speed_hz)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build();
        spi.configure(&options)
            .map_err(|e| DisplayError::SpiError(format!("configuring {}: {}", bus.bus, e)))?;

        let mut chip = Chip::new(chip_path)
            .map_err(|e| DisplayError::GpioError(format!("opening {}: {}", chip_path, e)))?;

        // D/C idles in command mode, RES idles high so the panel is not held in reset
        let dc = request_output(&mut chip, bus.dc_pin, 0, "lcd5110-dc")?;
        let rst = request_output(&mut chip, bus.rst_pin, 1, "lcd5110-rst")?;

        Ok(SpiTransport::new(spi, dc, rst, Delay {}))
    }

    fn request_output(chip: &mut Chip, line: u32, default: u8, consumer: &str) -> Result<CdevPin, DisplayError> {
        let handle = chip
            .get_line(line)
            .and_then(|l| l.request(LineRequestFlags::OUTPUT, default, consumer))
            .map_err(|e| DisplayError::GpioError(format!("requesting line {}: {}", line, e)))?;
        CdevPin::new(handle).map_err(|e| DisplayError::GpioError(format!("line {}: {}", line, e)))
    }
}
