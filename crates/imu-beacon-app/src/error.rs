use baton::BatonError;
use derive_more::From;

use crate::hal::RadioError;

/// Failure of a task step that touches the sensor through the baton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NodeError<E> {
    Baton(BatonError),
    Sensor(E),
}

impl<E> From<BatonError> for NodeError<E> {
    fn from(e: BatonError) -> Self {
        NodeError::Baton(e)
    }
}

/// Failure of a radio step run under the baton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, From)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    Baton(BatonError),
    Radio(RadioError),
}
