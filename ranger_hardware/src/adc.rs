use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use tracing::trace;

use crate::error::{HwError, Result};

/// Full-scale code of the 10-bit converter.
const MAX_CODE: u16 = 1023;
const SPI_CLOCK_HZ: u32 = 1_350_000;

/// MCP3008 10-bit ADC on SPI0/CE0, single-ended mode.
pub struct Mcp3008 {
    spi: Spi,
    channel: u8,
}

impl Mcp3008 {
    pub fn new(channel: u8) -> Result<Self> {
        if channel > 7 {
            return Err(HwError::Spi(format!("mcp3008 has no channel {channel}")));
        }
        let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, SPI_CLOCK_HZ, Mode::Mode0)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        Ok(Self { spi, channel })
    }

    /// Raw 10-bit conversion code.
    pub fn read_code(&mut self) -> Result<u16> {
        // start bit, single-ended + channel, then clock out the result
        let tx = [0x01, (0x08 | self.channel) << 4, 0x00];
        let mut rx = [0u8; 3];
        let n = self
            .spi
            .transfer(&mut rx, &tx)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        if n < rx.len() {
            return Err(HwError::ShortFrame(n));
        }
        let code = (u16::from(rx[1] & 0x03) << 8) | u16::from(rx[2]);
        trace!(channel = self.channel, code, "mcp3008 conversion");
        Ok(code)
    }
}

/// IR range sensor behind the MCP3008, reporting normalized [0, 1] readings.
pub struct HardwareSensor {
    adc: Mcp3008,
}

impl HardwareSensor {
    pub fn new(channel: u8) -> Result<Self> {
        Ok(Self {
            adc: Mcp3008::new(channel)?,
        })
    }
}

impl ranger_traits::AnalogSensor for HardwareSensor {
    fn read(&mut self) -> ranger_traits::HwResult<f32> {
        let code = self.adc.read_code()?;
        Ok(f32::from(code) / f32::from(MAX_CODE))
    }
}
