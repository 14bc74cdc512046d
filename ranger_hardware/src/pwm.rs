use rppal::pwm::{Channel, Polarity, Pwm};
use tracing::debug;

use crate::error::{HwError, Result};
use crate::servo::PulseCalibration;

fn pwm_err(e: rppal::pwm::Error) -> HwError {
    HwError::Pwm(e.to_string())
}

/// Hobby servo on one of the two hardware PWM channels.
///
/// The channel is created disabled; `enable()` must precede commands.
pub struct HardwareServo {
    pwm: Pwm,
    calibration: PulseCalibration,
    enabled: bool,
}

impl HardwareServo {
    pub fn new(channel: u8, frequency_hz: f64, calibration: PulseCalibration) -> Result<Self> {
        let ch = match channel {
            0 => Channel::Pwm0,
            1 => Channel::Pwm1,
            other => return Err(HwError::Pwm(format!("no pwm channel {other}"))),
        };
        let pwm = Pwm::with_frequency(
            ch,
            frequency_hz,
            f64::from(calibration.min),
            Polarity::Normal,
            false,
        )
        .map_err(pwm_err)?;
        Ok(Self {
            pwm,
            calibration,
            enabled: false,
        })
    }
}

impl ranger_traits::Actuator for HardwareServo {
    fn enable(&mut self) -> ranger_traits::HwResult<()> {
        self.pwm.enable().map_err(pwm_err)?;
        self.enabled = true;
        debug!("servo enabled");
        Ok(())
    }

    fn disable(&mut self) -> ranger_traits::HwResult<()> {
        self.pwm.disable().map_err(pwm_err)?;
        self.enabled = false;
        debug!("servo disabled");
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_normalized(&mut self, command: f32) -> ranger_traits::HwResult<()> {
        if !self.enabled {
            return Err(Box::new(HwError::NotEnabled));
        }
        let duty = self.calibration.duty_cycle(command);
        self.pwm.set_duty_cycle(f64::from(duty)).map_err(pwm_err)?;
        Ok(())
    }
}
