//! RF Data Line
//!
//! Exclusive handle on the GPIO that keys the OOK transmitter module.
//! Bring-up configures a push-pull output, initially low, before the
//! transmitter can see it; dropping the handle drives the line low and
//! embassy then returns the pin to its reset state.

use core::convert::Infallible;

use embassy_stm32::gpio::{Level, Output, Pin, Speed};
use embassy_stm32::Peripheral;
use embedded_hal::digital::{ErrorType, OutputPin};

/// OOK data line
pub struct RfLine<'d> {
    pin: Output<'d>,
}

impl<'d> RfLine<'d> {
    /// Configure `pin` as the data line, driven low
    pub fn new(pin: impl Peripheral<P = impl Pin> + 'd) -> Self {
        let pin = Output::new(pin, Level::Low, Speed::VeryHigh);
        info!("rf line configured, low");
        Self { pin }
    }

    /// Check if the line is currently driven high
    #[must_use]
    pub fn is_high(&self) -> bool {
        self.pin.is_set_high()
    }
}

impl ErrorType for RfLine<'_> {
    type Error = Infallible;
}

impl OutputPin for RfLine<'_> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.pin.set_low();
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.pin.set_high();
        Ok(())
    }
}

impl Drop for RfLine<'_> {
    fn drop(&mut self) {
        self.pin.set_low();
        debug!("rf line released");
    }
}
