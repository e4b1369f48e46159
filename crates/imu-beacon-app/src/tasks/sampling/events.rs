/// The three sensors sampled on their own data-ready interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorKind {
    Mag,
    Gyro,
    Accel,
}

/// Board pins wired to the IMU interrupt outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum InterruptLine {
    Gyro = 12,
    Mag = 15,
    Accel = 22,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptLineError {
    UnknownPin(u8),
}

impl TryFrom<u8> for InterruptLine {
    type Error = InterruptLineError;
    fn try_from(pin: u8) -> Result<Self, Self::Error> {
        match pin {
            12 => Ok(InterruptLine::Gyro),
            15 => Ok(InterruptLine::Mag),
            22 => Ok(InterruptLine::Accel),
            _ => Err(InterruptLineError::UnknownPin(pin)),
        }
    }
}

impl From<InterruptLine> for SensorKind {
    fn from(line: InterruptLine) -> Self {
        match line {
            InterruptLine::Gyro => SensorKind::Gyro,
            InterruptLine::Mag => SensorKind::Mag,
            InterruptLine::Accel => SensorKind::Accel,
        }
    }
}
