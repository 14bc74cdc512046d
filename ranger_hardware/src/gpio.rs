use std::time::{Duration, Instant};

pub use rppal::gpio::Gpio;
use rppal::gpio::{InputPin, OutputPin, Trigger};
use tracing::{debug, trace};

use crate::debounce::EdgeDebouncer;
use crate::error::{HwError, Result};

fn gpio_err(e: rppal::gpio::Error) -> HwError {
    HwError::Gpio(e.to_string())
}

/// Mechanical button sampled by level, wired with the internal pull-up.
pub struct HardwareButton {
    pin: InputPin,
    active_low: bool,
}

impl HardwareButton {
    pub fn new(gpio: &Gpio, bcm: u8, active_low: bool) -> Result<Self> {
        let pin = gpio.get(bcm).map_err(gpio_err)?.into_input_pullup();
        Ok(Self { pin, active_low })
    }
}

impl ranger_traits::LevelButton for HardwareButton {
    fn is_pressed(&mut self) -> ranger_traits::HwResult<bool> {
        let low = self.pin.is_low();
        Ok(if self.active_low { low } else { !low })
    }
}

/// LED on a push-pull output.
pub struct HardwareLed {
    pin: OutputPin,
}

impl HardwareLed {
    pub fn new(gpio: &Gpio, bcm: u8) -> Result<Self> {
        let pin = gpio.get(bcm).map_err(gpio_err)?.into_output_low();
        Ok(Self { pin })
    }
}

impl ranger_traits::Indicator for HardwareLed {
    fn set(&mut self, on: bool) -> ranger_traits::HwResult<()> {
        if on {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
        Ok(())
    }

    fn is_on(&self) -> bool {
        self.pin.is_set_high()
    }
}

/// Register `on_press` for debounced falling edges of the toggle button.
///
/// The callback runs on rppal's interrupt thread; it must stay short and
/// non-blocking. Dropping the returned pin cancels the interrupt.
pub fn watch_falling_edge<F>(
    gpio: &Gpio,
    bcm: u8,
    debounce: Duration,
    mut on_press: F,
) -> Result<InputPin>
where
    F: FnMut() + Send + 'static,
{
    let mut pin = gpio.get(bcm).map_err(gpio_err)?.into_input_pullup();
    let mut debouncer = EdgeDebouncer::new(debounce);
    pin.set_async_interrupt(Trigger::FallingEdge, move |_level| {
        if debouncer.accept(Instant::now()) {
            on_press();
        } else {
            trace!("toggle button bounce suppressed");
        }
    })
    .map_err(gpio_err)?;
    debug!(pin = bcm, debounce_ms = debounce.as_millis() as u64, "edge watcher armed");
    Ok(pin)
}
