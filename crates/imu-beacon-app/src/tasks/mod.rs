pub mod bringup;
pub mod clock;
pub mod console;
pub mod radio;
pub mod sampling;

// Re-exports
pub use bringup::*;
pub use clock::*;
pub use console::*;
pub use radio::*;
pub use sampling::*;

/// Every task the node runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskId {
    Initialization,
    Calibration,
    Mag,
    Gyro,
    Accel,
    Transmit,
    Restart,
    Beacon,
    Console,
}

/// Scheduling priority, higher runs first.
///
/// Boards with interrupt executors map these onto executor levels; a single
/// cooperative executor may ignore them since no task ever spins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskPriority(pub u8);

impl TaskId {
    pub const ALL: [TaskId; 9] = [
        TaskId::Initialization,
        TaskId::Calibration,
        TaskId::Mag,
        TaskId::Gyro,
        TaskId::Accel,
        TaskId::Transmit,
        TaskId::Restart,
        TaskId::Beacon,
        TaskId::Console,
    ];

    pub const fn priority(self) -> TaskPriority {
        match self {
            TaskId::Initialization => TaskPriority(4),
            TaskId::Calibration => TaskPriority(3),
            TaskId::Console => TaskPriority(1),
            _ => TaskPriority(2),
        }
    }
}
