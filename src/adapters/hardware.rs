//! Hardware adapter: the GPIO bank behind [`ActuatorPort`].
//!
//! [`PinBank`] owns one output line per [`PinId`] and is the only type in
//! the system that writes to actual pins.  It is generic over any
//! `embedded_hal` output pin, so host tests can drive it with a recording
//! pin while the firmware builds it from `esp_idf_hal` `PinDriver`s.

use embedded_hal::digital::OutputPin;
use log::{info, warn};

use crate::app::ports::{ActuatorPort, Level, PinId};
use crate::error::ActuatorError;

/// Eight output lines in [`PinId::ALL`] order.
pub struct PinBank<P: OutputPin> {
    lines: [P; 8],
    initialized: bool,
}

impl<P: OutputPin> PinBank<P> {
    /// Wrap already-constructed pins.  `lines[i]` must drive `PinId::ALL[i]`.
    pub fn new(lines: [P; 8]) -> Self {
        Self {
            lines,
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn write(&mut self, pin: PinId, level: Level) -> Result<(), ActuatorError> {
        let line = &mut self.lines[pin.index()];
        let result = match level {
            Level::High => line.set_high(),
            Level::Low => line.set_low(),
        };
        result.map_err(|_| ActuatorError::GpioWriteFailed(pin))
    }

    /// Drive every line low, attempting all of them.
    fn all_low(&mut self) -> Result<(), ActuatorError> {
        let mut first = Ok(());
        for pin in PinId::ALL {
            if let Err(e) = self.write(pin, Level::Low) {
                warn!("PinBank: {} stuck: {}", pin, e);
                first = first.and(Err(e));
            }
        }
        first
    }
}

impl<P: OutputPin> ActuatorPort for PinBank<P> {
    fn initialize(&mut self) -> Result<(), ActuatorError> {
        self.all_low().map_err(|e| match e {
            ActuatorError::GpioWriteFailed(pin) => ActuatorError::GpioConfigFailed(pin),
            other => other,
        })?;
        if !self.initialized {
            info!("PinBank: {} lines configured LOW", PinId::ALL.len());
        }
        self.initialized = true;
        Ok(())
    }

    fn set_level(&mut self, pin: PinId, level: Level) -> Result<(), ActuatorError> {
        if !self.initialized {
            return Err(ActuatorError::NotInitialized);
        }
        self.write(pin, level)
    }

    fn cleanup(&mut self) {
        if let Err(e) = self.all_low() {
            warn!("PinBank: cleanup incomplete: {}", e);
        }
        self.initialized = false;
        info!("PinBank: released");
    }
}

// ── ESP-IDF construction ──────────────────────────────────────

#[cfg(target_os = "espidf")]
pub type EspPinBank = PinBank<
    esp_idf_hal::gpio::PinDriver<
        'static,
        esp_idf_hal::gpio::AnyOutputPin,
        esp_idf_hal::gpio::Output,
    >,
>;

#[cfg(target_os = "espidf")]
impl EspPinBank {
    /// Claim every GPIO listed in [`pins`](crate::pins) as a push-pull output.
    ///
    /// The caller must not hand the same GPIOs to any other driver.
    pub fn take() -> crate::error::Result<Self> {
        use esp_idf_hal::gpio::{AnyOutputPin, PinDriver};

        let mut drivers = Vec::with_capacity(PinId::ALL.len());
        for pin in PinId::ALL {
            // SAFETY: pins.rs is the sole owner of these GPIO numbers.
            let gpio = unsafe { AnyOutputPin::new(crate::pins::gpio_for(pin)) };
            let driver = PinDriver::output(gpio)
                .map_err(|_| crate::error::Error::Init("GPIO output driver"))?;
            drivers.push(driver);
        }
        let lines = drivers
            .try_into()
            .map_err(|_| crate::error::Error::Init("GPIO bank size"))?;
        Ok(Self::new(lines))
    }
}
