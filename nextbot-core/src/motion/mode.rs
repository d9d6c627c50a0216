//! Motion modes

/// What the drive train is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionMode {
    /// No output; the update step is a no-op
    #[default]
    Stopped,
    /// Straight travel at a capped speed, never completes on its own
    OpenLoopMove,
    /// Straight travel to a pulse target, completes when settled
    MoveToPosition,
    /// Rotation in place to a pulse target, completes when settled
    RotateToAngle,
    /// Inner velocity loops only, never completes on its own
    WheelVelocity,
}

impl MotionMode {
    /// Check if this mode runs the position loops
    pub fn is_positioning(&self) -> bool {
        matches!(
            self,
            MotionMode::OpenLoopMove | MotionMode::MoveToPosition | MotionMode::RotateToAngle
        )
    }

    /// Check if this mode ends by itself once the wheels settle
    pub fn self_terminates(&self) -> bool {
        matches!(self, MotionMode::MoveToPosition | MotionMode::RotateToAngle)
    }
}

/// Result of one update step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionStatus {
    /// Still driving
    Active,
    /// Stopped, either already or as a result of this step
    Settled,
}
