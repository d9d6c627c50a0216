//! Cascaded motion controller
//!
//! Outer position loops turn pulse errors into wheel velocity references, a
//! balance loop keeps the wheels in step, and inner velocity loops turn
//! velocity errors into motor output:
//!
//! ```text
//! target_L ─►(+)─► position_L ─►(−)─► ω_ref_L ─►(+)─► velocity_L ─► motor_L
//!             ▲ L               ▲ balance        ▲ ω_L
//! target_R ─►(+)─► position_R ─►(±)─► ω_ref_R ─►(+)─► velocity_R ─► motor_R
//!             ▲ R               ▲ balance        ▲ ω_R
//! ```
//!
//! For straight travel the balance loop acts on `L − R` and is added to the
//! right reference. For rotation a separate loop acts on `(L + R) / 2` and is
//! subtracted from both.
//!
//! Positioning maneuvers complete once both outputs stay within the settle
//! threshold for the configured number of consecutive updates.

use nextbot_protocol::Drive;

use super::mode::{MotionMode, MotionStatus};
use crate::config::{DriveLimits, RobotConfig, SettleConfig, WheelGeometry};
use crate::control::Pid;
use crate::traits::{WheelEncoder, WheelMotor};

/// The six loops of the cascade
#[derive(Debug, Clone, Copy)]
struct Loops {
    position_left: Pid,
    position_right: Pid,
    balance: Pid,
    rotation_balance: Pid,
    velocity_left: Pid,
    velocity_right: Pid,
}

impl Loops {
    fn flush(&mut self) {
        self.position_left.flush();
        self.position_right.flush();
        self.balance.flush();
        self.rotation_balance.flush();
        self.velocity_left.flush();
        self.velocity_right.flush();
    }
}

/// Mode-based drive train controller
///
/// Owns both wheel encoders and motors. `update` must be called at a fixed
/// rate from the main loop; every other method only changes targets.
pub struct MotionController<E, M> {
    left_encoder: E,
    right_encoder: E,
    left_motor: M,
    right_motor: M,
    loops: Loops,
    geometry: WheelGeometry,
    settle: SettleConfig,
    limits: DriveLimits,
    mode: MotionMode,
    target_left: i32,
    target_right: i32,
    omega_ref_left: f32,
    omega_ref_right: f32,
    omega_cap: Option<f32>,
    settle_count: u32,
    last_output: (f32, f32),
}

impl<E: WheelEncoder, M: WheelMotor> MotionController<E, M> {
    /// Create a stopped controller
    pub fn new(
        left_encoder: E,
        right_encoder: E,
        left_motor: M,
        right_motor: M,
        config: &RobotConfig,
    ) -> Self {
        let gains = &config.gains;
        Self {
            left_encoder,
            right_encoder,
            left_motor,
            right_motor,
            loops: Loops {
                position_left: Pid::new(gains.position_left),
                position_right: Pid::new(gains.position_right),
                balance: Pid::new(gains.balance),
                rotation_balance: Pid::new(gains.rotation_balance),
                velocity_left: Pid::new(gains.velocity_left),
                velocity_right: Pid::new(gains.velocity_right),
            },
            geometry: config.geometry,
            settle: config.settle,
            limits: config.drive,
            mode: MotionMode::Stopped,
            target_left: 0,
            target_right: 0,
            omega_ref_left: 0.0,
            omega_ref_right: 0.0,
            omega_cap: None,
            settle_count: 0,
            last_output: (0.0, 0.0),
        }
    }

    /// Current mode
    pub fn mode(&self) -> MotionMode {
        self.mode
    }

    /// Check if the drive train is stopped
    pub fn is_stopped(&self) -> bool {
        self.mode == MotionMode::Stopped
    }

    /// Pulse targets `(left, right)` of the current positioning maneuver
    pub fn targets(&self) -> (i32, i32) {
        (self.target_left, self.target_right)
    }

    /// Wheel velocity references `(left, right)` in rad/s
    pub fn velocity_refs(&self) -> (f32, f32) {
        (self.omega_ref_left, self.omega_ref_right)
    }

    /// Motor outputs `(left, right)` of the last update
    pub fn last_output(&self) -> (f32, f32) {
        self.last_output
    }

    /// Both encoders
    pub fn encoders(&self) -> (&E, &E) {
        (&self.left_encoder, &self.right_encoder)
    }

    /// Both encoders, mutably
    pub fn encoders_mut(&mut self) -> (&mut E, &mut E) {
        (&mut self.left_encoder, &mut self.right_encoder)
    }

    /// Both motors
    pub fn motors(&self) -> (&M, &M) {
        (&self.left_motor, &self.right_motor)
    }

    /// Drive straight by `distance_m` metres (negative reverses)
    pub fn move_to(&mut self, distance_m: f32) {
        let target = (distance_m * self.geometry.pulses_per_metre()) as i32;
        self.target_left = target;
        self.target_right = target;
        self.omega_cap = None;
        self.enter(MotionMode::MoveToPosition);
    }

    /// Rotate in place by `angle_rad` radians (positive drives the left
    /// wheel forward)
    pub fn rotate_to(&mut self, angle_rad: f32) {
        let target =
            (angle_rad * self.geometry.half_wheelbase_m * self.geometry.pulses_per_metre()) as i32;
        self.target_left = target;
        self.target_right = -target;
        self.omega_cap = None;
        self.enter(MotionMode::RotateToAngle);
    }

    /// Drive straight until told otherwise, with wheel speed capped by
    /// `speed` (0..=255 of the maximum)
    pub fn move_open_loop(&mut self, direction: Drive, speed: u8) {
        let target = match direction {
            Drive::Forward => self.limits.open_loop_target,
            Drive::Reverse => -self.limits.open_loop_target,
            Drive::Stop => return self.stop(),
        };
        self.target_left = target;
        self.target_right = target;
        self.omega_cap = Some(self.speed_to_omega(speed));
        self.enter(MotionMode::OpenLoopMove);
    }

    /// Run only the velocity loops with the given references in rad/s
    pub fn wheel_velocity(&mut self, omega_left: f32, omega_right: f32) {
        self.omega_ref_left = omega_left;
        self.omega_ref_right = omega_right;
        self.omega_cap = None;
        if self.mode != MotionMode::WheelVelocity {
            self.enter(MotionMode::WheelVelocity);
        }
    }

    /// Set the left wheel velocity, keeping the right one if already in
    /// velocity mode
    pub fn left_motor(&mut self, direction: Drive, speed: u8) {
        let Some(omega) = self.signed_omega(direction, speed) else {
            return self.stop();
        };
        let right = self.held_velocity().1;
        self.wheel_velocity(omega, right);
    }

    /// Set the right wheel velocity, keeping the left one if already in
    /// velocity mode
    pub fn right_motor(&mut self, direction: Drive, speed: u8) {
        let Some(omega) = self.signed_omega(direction, speed) else {
            return self.stop();
        };
        let left = self.held_velocity().0;
        self.wheel_velocity(left, omega);
    }

    /// Spin in place; forward turns the left wheel forward
    pub fn turn(&mut self, direction: Drive, speed: u8) {
        let Some(omega) = self.signed_omega(direction, speed) else {
            return self.stop();
        };
        self.wheel_velocity(omega, -omega);
    }

    /// Cut motor output and drop to `Stopped`
    pub fn stop(&mut self) {
        self.left_motor.stop();
        self.right_motor.stop();
        self.settle_count = 0;
        self.omega_ref_left = 0.0;
        self.omega_ref_right = 0.0;
        self.last_output = (0.0, 0.0);
        if self.mode != MotionMode::Stopped {
            debug!("motion: {} -> Stopped", self.mode);
            self.mode = MotionMode::Stopped;
        }
    }

    /// Run one control step at time `now_us`
    pub fn update(&mut self, now_us: u64) -> MotionStatus {
        match self.mode {
            MotionMode::Stopped => MotionStatus::Settled,
            MotionMode::WheelVelocity => {
                self.velocity_step(self.omega_ref_left, self.omega_ref_right, now_us);
                MotionStatus::Active
            }
            MotionMode::OpenLoopMove | MotionMode::MoveToPosition | MotionMode::RotateToAngle => {
                self.cascade_step(now_us)
            }
        }
    }

    fn enter(&mut self, mode: MotionMode) {
        self.loops.flush();
        self.left_encoder.reset();
        self.right_encoder.reset();
        self.settle_count = 0;
        debug!("motion: {} -> {}", self.mode, mode);
        self.mode = mode;
    }

    fn cascade_step(&mut self, now_us: u64) -> MotionStatus {
        let left = self.left_encoder.pulses() as i64;
        let right = self.right_encoder.pulses() as i64;
        let rotating = self.mode == MotionMode::RotateToAngle;

        let balance = if rotating {
            self.loops.rotation_balance.compute(((left + right) / 2) as f32)
        } else {
            self.loops.balance.compute((left - right) as f32)
        };

        let error_left = (self.target_left as i64 - left) as f32;
        let error_right = (self.target_right as i64 - right) as f32;
        let mut omega_left = self.loops.position_left.compute(error_left) - balance;
        let mut omega_right = if rotating {
            self.loops.position_right.compute(error_right) - balance
        } else {
            self.loops.position_right.compute(error_right) + balance
        };

        if let Some(cap) = self.omega_cap {
            omega_left = omega_left.clamp(-cap, cap);
            omega_right = omega_right.clamp(-cap, cap);
        }
        self.omega_ref_left = omega_left;
        self.omega_ref_right = omega_right;

        let (out_left, out_right) = self.velocity_step(omega_left, omega_right, now_us);

        if !self.mode.self_terminates() {
            return MotionStatus::Active;
        }

        let threshold = self.settle.pwm_threshold;
        if out_left.abs() <= threshold && out_right.abs() <= threshold {
            if self.settle_count >= self.settle.required_updates {
                info!(
                    "motion: settled at L={} R={}",
                    self.left_encoder.pulses(),
                    self.right_encoder.pulses()
                );
                self.stop();
                return MotionStatus::Settled;
            }
            self.settle_count += 1;
        } else {
            self.settle_count = 0;
        }

        MotionStatus::Active
    }

    fn velocity_step(&mut self, omega_left: f32, omega_right: f32, now_us: u64) -> (f32, f32) {
        let measured_left = self.left_encoder.angular_velocity(now_us);
        let measured_right = self.right_encoder.angular_velocity(now_us);

        let out_left = self.loops.velocity_left.compute(omega_left - measured_left);
        let out_right = self
            .loops
            .velocity_right
            .compute(omega_right - measured_right);

        self.left_motor.drive(out_left);
        self.right_motor.drive(out_right);
        self.last_output = (out_left, out_right);
        (out_left, out_right)
    }

    fn speed_to_omega(&self, speed: u8) -> f32 {
        speed as f32 / 255.0 * self.limits.max_wheel_omega
    }

    fn signed_omega(&self, direction: Drive, speed: u8) -> Option<f32> {
        match direction {
            Drive::Stop => None,
            d => Some(d.sign() as f32 * self.speed_to_omega(speed)),
        }
    }

    fn held_velocity(&self) -> (f32, f32) {
        if self.mode == MotionMode::WheelVelocity {
            (self.omega_ref_left, self.omega_ref_right)
        } else {
            (0.0, 0.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::PI;

    const DT_US: u64 = 1000;

    /// Encoder whose position is driven by a simulated wheel
    #[derive(Default)]
    struct SimEncoder {
        radians: f32,
        omega: f32,
        resets: u32,
    }

    impl WheelEncoder for SimEncoder {
        fn pulses(&self) -> i32 {
            (self.radians / WheelGeometry::default().radians_per_pulse()) as i32
        }

        fn angular_velocity(&self, _now_us: u64) -> f32 {
            self.omega
        }

        fn reset(&mut self) {
            self.radians = 0.0;
            self.resets += 1;
        }
    }

    #[derive(Default)]
    struct MockMotor {
        output: f32,
        stops: u32,
    }

    impl WheelMotor for MockMotor {
        fn drive(&mut self, output: f32) {
            self.output = output.clamp(-255.0, 255.0);
        }

        fn stop(&mut self) {
            self.output = 0.0;
            self.stops += 1;
        }
    }

    type Controller = MotionController<SimEncoder, MockMotor>;

    fn controller() -> Controller {
        MotionController::new(
            SimEncoder::default(),
            SimEncoder::default(),
            MockMotor::default(),
            MockMotor::default(),
            &RobotConfig::default(),
        )
    }

    /// First-order wheel: full duty spins at ~10 rad/s, 50 ms time constant
    fn step_plant(ctrl: &mut Controller) {
        let (left, right) = ctrl.motors();
        let (out_left, out_right) = (left.output, right.output);
        let dt = DT_US as f32 / 1e6;

        let (enc_left, enc_right) = ctrl.encoders_mut();
        for (enc, out) in [(enc_left, out_left), (enc_right, out_right)] {
            enc.omega += (out * 10.0 / 255.0 - enc.omega) * dt / 0.05;
            enc.radians += enc.omega * dt;
        }
    }

    /// Run until settled, returning the number of updates taken
    fn run_until_settled(ctrl: &mut Controller, max_updates: u32) -> Option<u32> {
        let mut now = 0;
        for n in 0..max_updates {
            if ctrl.update(now) == MotionStatus::Settled {
                return Some(n);
            }
            step_plant(ctrl);
            now += DT_US;
        }
        None
    }

    #[test]
    fn test_new_is_stopped() {
        let mut ctrl = controller();
        assert_eq!(ctrl.mode(), MotionMode::Stopped);
        assert_eq!(ctrl.update(0), MotionStatus::Settled);
        assert_eq!(ctrl.motors().0.stops, 0);
    }

    #[test]
    fn test_move_to_targets() {
        let mut ctrl = controller();
        ctrl.move_to(0.1);
        // 0.1 × 960 / (2π × 0.0318) = 480.4
        assert_eq!(ctrl.targets(), (480, 480));
        assert_eq!(ctrl.mode(), MotionMode::MoveToPosition);

        ctrl.move_to(-0.1);
        assert_eq!(ctrl.targets(), (-480, -480));
    }

    #[test]
    fn test_rotate_to_targets() {
        let mut ctrl = controller();
        ctrl.rotate_to(PI / 2.0);
        // π/2 × 0.135 × 4804.7 = 1018.8
        assert_eq!(ctrl.targets(), (1018, -1018));
        assert_eq!(ctrl.mode(), MotionMode::RotateToAngle);
    }

    #[test]
    fn test_entering_mode_resets_encoders() {
        let mut ctrl = controller();
        ctrl.encoders_mut().0.radians = 3.0;
        ctrl.move_to(0.2);

        let (left, right) = ctrl.encoders();
        assert_eq!(left.pulses(), 0);
        assert_eq!(left.resets, 1);
        assert_eq!(right.resets, 1);
    }

    #[test]
    fn test_move_to_settles() {
        let mut ctrl = controller();
        ctrl.move_to(0.1);

        let updates = run_until_settled(&mut ctrl, 20_000).expect("maneuver never settled");
        // At least the quiet period must elapse
        assert!(updates > 1000);
        assert!(ctrl.is_stopped());

        let (left, right) = ctrl.encoders();
        assert!((left.pulses() - 480).abs() <= 20);
        assert!((right.pulses() - 480).abs() <= 20);
        assert_eq!(ctrl.motors().0.output, 0.0);
        assert_eq!(ctrl.motors().1.output, 0.0);
    }

    #[test]
    fn test_settle_needs_quiet_period() {
        let mut ctrl = controller();
        ctrl.move_to(0.0);

        // Zero target: outputs stay at zero, so only the counter matters
        for n in 0..1000 {
            assert_eq!(ctrl.update(n * DT_US), MotionStatus::Active);
        }
        assert_eq!(ctrl.update(1000 * DT_US), MotionStatus::Settled);
        assert!(ctrl.is_stopped());
    }

    #[test]
    fn test_rotation_is_symmetric() {
        let mut ccw = controller();
        let mut cw = controller();
        ccw.rotate_to(PI / 2.0);
        cw.rotate_to(-PI / 2.0);

        let (l, r) = ccw.targets();
        assert_eq!(cw.targets(), (-l, -r));

        let a = run_until_settled(&mut ccw, 20_000).expect("ccw never settled");
        let b = run_until_settled(&mut cw, 20_000).expect("cw never settled");
        assert_eq!(a, b);

        let (cl, cr) = ccw.encoders();
        let (wl, wr) = cw.encoders();
        assert_eq!(cl.pulses(), -wl.pulses());
        assert_eq!(cr.pulses(), -wr.pulses());
        assert!((cl.pulses() - 1018).abs() <= 30);
        assert!((cr.pulses() + 1018).abs() <= 30);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut ctrl = controller();
        ctrl.move_to(0.3);
        ctrl.update(0);

        ctrl.stop();
        assert!(ctrl.is_stopped());
        assert_eq!(ctrl.motors().0.output, 0.0);

        ctrl.stop();
        assert!(ctrl.is_stopped());
        assert_eq!(ctrl.motors().0.output, 0.0);
        assert_eq!(ctrl.motors().1.output, 0.0);
        assert_eq!(ctrl.update(DT_US), MotionStatus::Settled);
    }

    #[test]
    fn test_open_loop_never_settles() {
        let mut ctrl = controller();
        ctrl.move_open_loop(Drive::Forward, 255);
        assert_eq!(ctrl.targets(), (9_000_000, 9_000_000));

        let mut now = 0;
        for _ in 0..3000 {
            assert_eq!(ctrl.update(now), MotionStatus::Active);
            step_plant(&mut ctrl);
            now += DT_US;
        }

        // Capped at the maximum wheel velocity
        let (left, right) = ctrl.velocity_refs();
        assert!(left <= 8.0 + 1e-4 && left > 0.0);
        assert!(right <= 8.0 + 1e-4 && right > 0.0);
        assert!(ctrl.encoders().0.pulses() > 0);
    }

    #[test]
    fn test_open_loop_speed_cap() {
        let mut ctrl = controller();
        ctrl.move_open_loop(Drive::Reverse, 51);
        assert_eq!(ctrl.targets(), (-9_000_000, -9_000_000));

        ctrl.update(0);
        let (left, right) = ctrl.velocity_refs();
        // 51 / 255 × 8.0
        assert!((left + 1.6).abs() < 1e-4);
        assert!((right + 1.6).abs() < 1e-4);
    }

    #[test]
    fn test_left_then_right_motor() {
        let mut ctrl = controller();
        ctrl.left_motor(Drive::Forward, 255);
        assert_eq!(ctrl.mode(), MotionMode::WheelVelocity);
        assert_eq!(ctrl.velocity_refs(), (8.0, 0.0));

        ctrl.right_motor(Drive::Reverse, 255);
        assert_eq!(ctrl.velocity_refs(), (8.0, -8.0));
        // Already in velocity mode, no second reset
        assert_eq!(ctrl.encoders().0.resets, 1);

        assert_eq!(ctrl.update(0), MotionStatus::Active);
        assert!(ctrl.motors().0.output > 0.0);
        assert!(ctrl.motors().1.output < 0.0);
    }

    #[test]
    fn test_turn_spins_in_place() {
        let mut ctrl = controller();
        ctrl.turn(Drive::Forward, 255);
        assert_eq!(ctrl.velocity_refs(), (8.0, -8.0));

        ctrl.turn(Drive::Reverse, 255);
        assert_eq!(ctrl.velocity_refs(), (-8.0, 8.0));
    }

    #[test]
    fn test_stop_direction_stops() {
        let mut ctrl = controller();
        ctrl.turn(Drive::Forward, 100);
        ctrl.left_motor(Drive::Stop, 100);
        assert!(ctrl.is_stopped());

        ctrl.move_open_loop(Drive::Forward, 100);
        ctrl.move_open_loop(Drive::Stop, 100);
        assert!(ctrl.is_stopped());
    }
}
