//! Slave-side communicator
//!
//! Runs in the main loop. Bytes from the master are queued by the bus
//! context behind an [`I2cTarget`]; each [`Slave::poll`] runs one motion
//! update and then advances dispatch by one phase:
//!
//! ```text
//!          command read                  settled / budget spent
//!   Idle ───────────────► Maneuvering ───────────────────────┐
//!    ▲  │                                                     ▼
//!    │  │ DrawText         text / new command / timeout
//!    │  └──────────► AwaitingText ──────────────────────► Responding
//!    │  │                                                     │
//!    │  └─ other commands ───────────────────────────────────►│
//!    └────────────────────────── response staged ─────────────┘
//! ```
//!
//! Commands that arrive while a maneuver runs stay queued until it ends.

use nextbot_hal::{Clock, I2cTarget};
use nextbot_protocol::packet::{COMMAND_END, COMMAND_START, DATA_START};
use nextbot_protocol::{
    Command, CommandPacket, DataPacket, Opcode, ResponsePacket, Status, COMMAND_LEN, DATA_LEN,
};

use crate::config::{CommsConfig, RobotConfig};
use crate::motion::{MotionController, MotionStatus};
use crate::traits::{GraphicsEngine, WheelEncoder, WheelMotor};

/// Dispatch phase of the slave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Waiting for a command
    Idle,
    /// Positioning command running; `updates` counts motion steps so far
    Maneuvering { updates: u32 },
    /// `DrawText` received, waiting for its data packet
    AwaitingText { polls_left: u32 },
    /// Command handled, response not staged yet
    Responding,
}

/// Bus target that executes commands
pub struct Slave<T, G, E, M, C> {
    target: T,
    graphics: G,
    motion: MotionController<E, M>,
    clock: C,
    comms: CommsConfig,
    maneuver_budget: u32,
    command: [u8; COMMAND_LEN],
    data: [u8; DATA_LEN],
    command_ready: bool,
    data_ready: bool,
    current_id: u8,
    maneuver_failed: bool,
    phase: Phase,
}

impl<T, G, E, M, C> Slave<T, G, E, M, C>
where
    T: I2cTarget,
    G: GraphicsEngine,
    E: WheelEncoder,
    M: WheelMotor,
    C: Clock,
{
    /// Create an idle slave
    pub fn new(
        target: T,
        graphics: G,
        motion: MotionController<E, M>,
        clock: C,
        config: &RobotConfig,
    ) -> Self {
        Self {
            target,
            graphics,
            motion,
            clock,
            comms: config.comms,
            maneuver_budget: config.drive.maneuver_budget,
            command: [0; COMMAND_LEN],
            data: [0; DATA_LEN],
            command_ready: false,
            data_ready: false,
            current_id: 0,
            maneuver_failed: false,
            phase: Phase::Idle,
        }
    }

    /// Current dispatch phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Id of the command being (or last) handled
    pub fn current_id(&self) -> u8 {
        self.current_id
    }

    /// Motion controller
    pub fn motion(&self) -> &MotionController<E, M> {
        &self.motion
    }

    /// Motion controller, mutably
    pub fn motion_mut(&mut self) -> &mut MotionController<E, M> {
        &mut self.motion
    }

    /// Graphics collaborator
    pub fn graphics(&self) -> &G {
        &self.graphics
    }

    /// Check whether a command is waiting for dispatch
    pub fn command_ready(&self) -> bool {
        self.command_ready
    }

    /// Check whether a data packet has been received
    pub fn data_ready(&self) -> bool {
        self.data_ready
    }

    /// One main-loop step
    pub fn poll(&mut self) {
        let status = self.motion.update(self.clock.now_us());

        match self.phase {
            Phase::Idle => {
                self.receive_command();
                self.execute_command();
            }
            Phase::Maneuvering { updates } => {
                if status == MotionStatus::Settled {
                    self.phase = Phase::Responding;
                } else if updates >= self.maneuver_budget {
                    warn!("maneuver {} exceeded {} updates", self.current_id, updates);
                    self.motion.stop();
                    self.maneuver_failed = true;
                    self.phase = Phase::Responding;
                } else {
                    self.phase = Phase::Maneuvering {
                        updates: updates + 1,
                    };
                }
            }
            Phase::AwaitingText { polls_left } => self.await_text(polls_left),
            Phase::Responding => self.send_response(),
        }
    }

    /// Pull the next packet out of the receive buffer
    ///
    /// Does nothing while a command is still pending dispatch. Bytes that
    /// do not start a packet are dropped one at a time. A data packet that
    /// stops short is dropped as soon as a full command frame shows up
    /// behind it.
    pub fn receive_command(&mut self) {
        if self.command_ready {
            return;
        }

        while self.target.available() >= COMMAND_LEN {
            match self.target.peek() {
                Some(COMMAND_START) => {
                    self.target.read(&mut self.command);
                    self.command_ready = true;
                    self.data_ready = false;
                    return;
                }
                Some(DATA_START) => {
                    if self.target.available() >= DATA_LEN {
                        self.target.read(&mut self.data);
                        self.data_ready = true;
                        return;
                    }
                    // A truncated data packet must not swallow the next command
                    let Some(offset) = self.framed_command_offset() else {
                        return;
                    };
                    warn!("dropping truncated data packet ({} bytes)", offset);
                    let mut skip = [0u8; DATA_LEN];
                    self.target.read(&mut skip[..offset]);
                }
                Some(byte) => {
                    warn!("discarding stray byte {=u8:#x}", byte);
                    let mut skip = [0u8; 1];
                    self.target.read(&mut skip);
                }
                None => return,
            }
        }
    }

    /// Offset of a complete command frame inside a partial data packet
    fn framed_command_offset(&self) -> Option<usize> {
        let end = self.target.available().min(DATA_LEN);
        (1..end).find(|&i| {
            self.target.peek_at(i) == Some(COMMAND_START)
                && self.target.peek_at(i + COMMAND_LEN - 1) == Some(COMMAND_END)
        })
    }

    /// Dispatch a pending command
    pub fn execute_command(&mut self) {
        if !self.command_ready {
            return;
        }
        self.command_ready = false;

        let decoded = CommandPacket::decode(&self.command);
        if let Some(fault) = decoded.fault {
            warn!("command framing: {}", fault);
        }
        let packet = decoded.packet;
        self.current_id = packet.id;
        self.maneuver_failed = false;

        self.phase = match Command::from_packet(&packet) {
            Some(command) => self.dispatch(command),
            None => {
                if Opcode::from_byte(packet.opcode).is_some() {
                    warn!("bad parameters for opcode {=u8:#x}", packet.opcode);
                } else {
                    debug!("ignoring unknown opcode {=u8:#x}", packet.opcode);
                }
                Phase::Responding
            }
        };
    }

    /// Stage the response for the current command
    ///
    /// OK only when the drive train is stopped, no newer command is waiting
    /// and no maneuver was aborted.
    pub fn send_response(&mut self) {
        let superseded = self.target.peek() == Some(COMMAND_START);
        let ok = self.motion.is_stopped() && !superseded && !self.maneuver_failed;
        let status = if ok { Status::Ok } else { Status::Error };

        let response = ResponsePacket::new(self.current_id, status);
        self.target.respond(&response.encode());
        trace!("response {} for id {}", status, self.current_id);
        self.phase = Phase::Idle;
    }

    fn dispatch(&mut self, command: Command) -> Phase {
        let g = &mut self.graphics;
        match command {
            Command::DrawPoint { x, y } => g.draw_pixel(x, y),
            Command::DrawLine { x0, y0, x1, y1 } => g.draw_line(x0, y0, x1, y1),
            Command::DrawCircle { x, y, radius } => g.draw_circle(x, y, radius),
            Command::DrawDisc { x, y, radius } => g.draw_disc(x, y, radius),
            Command::DrawTriangle {
                x0,
                y0,
                x1,
                y1,
                x2,
                y2,
            } => g.draw_triangle(x0, y0, x1, y1, x2, y2),
            Command::DrawRectangle {
                x,
                y,
                width,
                height,
            } => g.draw_rectangle(x, y, width, height),
            Command::DrawBox {
                x,
                y,
                width,
                height,
            } => g.draw_box(x, y, width, height),
            Command::DrawText => {
                return Phase::AwaitingText {
                    polls_left: self.comms.text_wait_polls,
                }
            }
            Command::ClearScreen => g.clear(),
            Command::LeftMotor { direction, speed } => self.motion.left_motor(direction, speed),
            Command::RightMotor { direction, speed } => self.motion.right_motor(direction, speed),
            Command::Move { direction, speed } => self.motion.move_open_loop(direction, speed),
            Command::Turn { direction, speed } => self.motion.turn(direction, speed),
            Command::Stop => self.motion.stop(),
            Command::MoveTo { cm } => {
                self.motion.move_to(cm as f32 / 100.0);
                return Phase::Maneuvering { updates: 0 };
            }
            Command::RotateTo { degrees } => {
                self.motion.rotate_to((degrees as f32).to_radians());
                return Phase::Maneuvering { updates: 0 };
            }
        }
        Phase::Responding
    }

    fn await_text(&mut self, polls_left: u32) {
        if self.target.peek() == Some(COMMAND_START) {
            warn!("text for {} never came, next command waiting", self.current_id);
            self.phase = Phase::Responding;
            return;
        }

        self.receive_command();
        if self.data_ready {
            self.data_ready = false;
            let decoded = DataPacket::decode(&self.data);
            if let Some(fault) = decoded.fault {
                warn!("data framing: {}", fault);
            }
            match decoded.packet.text() {
                Ok(text) => self.graphics.draw_str(text),
                Err(e) => warn!("data text: {}", e),
            }
            self.phase = Phase::Responding;
        } else if polls_left == 0 {
            warn!("text for {} timed out", self.current_id);
            self.phase = Phase::Responding;
        } else {
            self.phase = Phase::AwaitingText {
                polls_left: polls_left - 1,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use heapless::{Deque, String, Vec};
    use nextbot_protocol::{Drive, RESPONSE_LEN};

    use crate::motion::MotionMode;

    #[derive(Default)]
    struct MockTarget {
        rx: Deque<u8, 128>,
        staged: Option<[u8; RESPONSE_LEN]>,
    }

    impl MockTarget {
        fn push(&mut self, bytes: &[u8]) {
            for &b in bytes {
                self.rx.push_back(b).unwrap();
            }
        }
    }

    impl I2cTarget for MockTarget {
        fn available(&self) -> usize {
            self.rx.len()
        }

        fn peek_at(&self, index: usize) -> Option<u8> {
            self.rx.iter().nth(index).copied()
        }

        fn read(&mut self, buf: &mut [u8]) -> usize {
            let mut n = 0;
            while n < buf.len() {
                match self.rx.pop_front() {
                    Some(b) => buf[n] = b,
                    None => break,
                }
                n += 1;
            }
            n
        }

        fn respond(&mut self, data: &[u8]) {
            let mut frame = [0u8; RESPONSE_LEN];
            frame.copy_from_slice(data);
            self.staged = Some(frame);
        }
    }

    #[derive(Debug, PartialEq)]
    enum Drawn {
        Pixel(u8, u8),
        Rectangle(u8, u8, u8, u8),
        Text(String<18>),
        Clear,
        Other,
    }

    #[derive(Default)]
    struct MockGraphics {
        calls: Vec<Drawn, 8>,
    }

    impl GraphicsEngine for MockGraphics {
        fn draw_pixel(&mut self, x: u8, y: u8) {
            self.calls.push(Drawn::Pixel(x, y)).unwrap();
        }
        fn draw_line(&mut self, _: u8, _: u8, _: u8, _: u8) {
            self.calls.push(Drawn::Other).unwrap();
        }
        fn draw_circle(&mut self, _: u8, _: u8, _: u8) {
            self.calls.push(Drawn::Other).unwrap();
        }
        fn draw_disc(&mut self, _: u8, _: u8, _: u8) {
            self.calls.push(Drawn::Other).unwrap();
        }
        fn draw_triangle(&mut self, _: u8, _: u8, _: u8, _: u8, _: u8, _: u8) {
            self.calls.push(Drawn::Other).unwrap();
        }
        fn draw_rectangle(&mut self, x: u8, y: u8, w: u8, h: u8) {
            self.calls.push(Drawn::Rectangle(x, y, w, h)).unwrap();
        }
        fn draw_box(&mut self, _: u8, _: u8, _: u8, _: u8) {
            self.calls.push(Drawn::Other).unwrap();
        }
        fn draw_str(&mut self, text: &str) {
            self.calls.push(Drawn::Text(String::try_from(text).unwrap())).unwrap();
        }
        fn clear(&mut self) {
            self.calls.push(Drawn::Clear).unwrap();
        }
    }

    /// Encoder on a wheel that never turns
    #[derive(Default)]
    struct StillEncoder;

    impl WheelEncoder for StillEncoder {
        fn pulses(&self) -> i32 {
            0
        }
        fn angular_velocity(&self, _now_us: u64) -> f32 {
            0.0
        }
        fn reset(&mut self) {}
    }

    #[derive(Default)]
    struct MockMotor {
        output: f32,
    }

    impl WheelMotor for MockMotor {
        fn drive(&mut self, output: f32) {
            self.output = output;
        }
        fn stop(&mut self) {
            self.output = 0.0;
        }
    }

    #[derive(Default)]
    struct MockClock {
        now: Cell<u64>,
    }

    impl Clock for MockClock {
        fn now_us(&self) -> u64 {
            let t = self.now.get();
            self.now.set(t + 1000);
            t
        }
    }

    type TestSlave = Slave<MockTarget, MockGraphics, StillEncoder, MockMotor, MockClock>;

    fn slave_with(config: RobotConfig) -> TestSlave {
        let motion = MotionController::new(
            StillEncoder,
            StillEncoder,
            MockMotor::default(),
            MockMotor::default(),
            &config,
        );
        Slave::new(
            MockTarget::default(),
            MockGraphics::default(),
            motion,
            MockClock::default(),
            &config,
        )
    }

    fn slave() -> TestSlave {
        slave_with(RobotConfig::default())
    }

    fn send(slave: &mut TestSlave, command: Command, id: u8) {
        slave.target.push(&command.to_packet(id).encode());
    }

    /// Poll until a response is staged, returning it
    fn run_until_response(slave: &mut TestSlave, max_polls: u32) -> ResponsePacket {
        for _ in 0..max_polls {
            slave.poll();
            if let Some(frame) = slave.target.staged.take() {
                let decoded = ResponsePacket::decode(&frame);
                assert!(decoded.is_well_formed());
                return decoded.packet;
            }
        }
        panic!("no response after {} polls", max_polls);
    }

    #[test]
    fn test_draw_rectangle_dispatch() {
        let mut s = slave();
        send(
            &mut s,
            Command::DrawRectangle {
                x: 10,
                y: 10,
                width: 20,
                height: 5,
            },
            0x42,
        );

        let response = run_until_response(&mut s, 4);
        assert_eq!(response, ResponsePacket::new(0x42, Status::Ok));
        assert_eq!(s.graphics().calls.as_slice(), &[Drawn::Rectangle(10, 10, 20, 5)]);
        assert_eq!(s.phase(), Phase::Idle);
    }

    #[test]
    fn test_waits_for_full_command() {
        let mut s = slave();
        let bytes = Command::ClearScreen.to_packet(1).encode();
        s.target.push(&bytes[..6]);

        s.poll();
        assert!(!s.command_ready());
        assert_eq!(s.phase(), Phase::Idle);

        s.target.push(&bytes[6..]);
        let response = run_until_response(&mut s, 4);
        assert_eq!(response.id, 1);
        assert_eq!(s.graphics().calls.as_slice(), &[Drawn::Clear]);
    }

    #[test]
    fn test_resyncs_past_garbage() {
        let mut s = slave();
        s.target.push(&[0x00, 0x13, 0x37]);
        send(&mut s, Command::DrawPoint { x: 3, y: 4 }, 9);

        let response = run_until_response(&mut s, 4);
        assert_eq!(response, ResponsePacket::new(9, Status::Ok));
        assert_eq!(s.graphics().calls.as_slice(), &[Drawn::Pixel(3, 4)]);
    }

    #[test]
    fn test_bad_end_marker_still_executes() {
        let mut s = slave();
        let mut bytes = Command::DrawPoint { x: 1, y: 2 }.to_packet(5).encode();
        bytes[9] = 0x00;
        s.target.push(&bytes);

        let response = run_until_response(&mut s, 4);
        assert_eq!(response.id, 5);
        assert_eq!(s.graphics().calls.as_slice(), &[Drawn::Pixel(1, 2)]);
    }

    #[test]
    fn test_unknown_opcode_dropped_but_answered() {
        let mut s = slave();
        s.target
            .push(&CommandPacket::new(7, 0x42, [1, 2, 3, 4, 5, 6]).encode());

        let response = run_until_response(&mut s, 4);
        assert_eq!(response, ResponsePacket::new(7, Status::Ok));
        assert!(s.graphics().calls.is_empty());
        assert!(s.motion().is_stopped());
    }

    #[test]
    fn test_draw_text() {
        let mut s = slave();
        send(&mut s, Command::DrawText, 3);
        s.target.push(&DataPacket::from_text("Hello").encode());

        let response = run_until_response(&mut s, 10);
        assert_eq!(response, ResponsePacket::new(3, Status::Ok));
        assert_eq!(
            s.graphics().calls.as_slice(),
            &[Drawn::Text(String::try_from("Hello").unwrap())]
        );
        assert!(!s.data_ready());
    }

    #[test]
    fn test_draw_text_times_out() {
        let mut config = RobotConfig::default();
        config.comms.text_wait_polls = 3;
        let mut s = slave_with(config);
        send(&mut s, Command::DrawText, 3);

        s.poll();
        assert_eq!(s.phase(), Phase::AwaitingText { polls_left: 3 });

        let response = run_until_response(&mut s, 10);
        assert_eq!(response.id, 3);
        assert!(s.graphics().calls.is_empty());
    }

    #[test]
    fn test_command_aborts_text_wait() {
        let mut s = slave();
        send(&mut s, Command::DrawText, 3);
        s.poll();

        send(&mut s, Command::ClearScreen, 4);
        let first = run_until_response(&mut s, 4);
        // Superseded by the waiting command
        assert_eq!(first, ResponsePacket::new(3, Status::Error));

        let second = run_until_response(&mut s, 4);
        assert_eq!(second, ResponsePacket::new(4, Status::Ok));
    }

    #[test]
    fn test_stale_data_cleared_by_command() {
        let mut s = slave();
        s.target.push(&DataPacket::from_text("old").encode());
        s.poll();
        assert!(s.data_ready());

        send(&mut s, Command::Stop, 1);
        s.receive_command();
        assert!(s.command_ready());
        assert!(!s.data_ready());
    }

    #[test]
    fn test_truncated_data_does_not_swallow_command() {
        let mut s = slave();
        // Start marker bytes inside the text must not be taken for a command
        let data = DataPacket::from_text("UUU").encode();
        s.target.push(&data[..6]);
        send(&mut s, Command::ClearScreen, 6);

        let response = run_until_response(&mut s, 4);
        assert_eq!(response, ResponsePacket::new(6, Status::Ok));
        assert_eq!(s.graphics().calls.as_slice(), &[Drawn::Clear]);
        assert!(!s.data_ready());
        assert_eq!(s.target.available(), 0);
    }

    #[test]
    fn test_partial_data_waits_without_command() {
        let mut s = slave();
        let data = DataPacket::from_text("Hi").encode();
        s.target.push(&data[..12]);

        s.poll();
        assert!(!s.data_ready());
        assert_eq!(s.target.available(), 12);

        s.target.push(&data[12..]);
        s.poll();
        assert!(s.data_ready());
    }

    #[test]
    fn test_receive_is_noop_while_pending() {
        let mut s = slave();
        send(&mut s, Command::Stop, 1);
        send(&mut s, Command::ClearScreen, 2);

        s.receive_command();
        s.receive_command();
        assert_eq!(s.target.available(), COMMAND_LEN);

        s.execute_command();
        assert_eq!(s.current_id(), 1);
    }

    #[test]
    fn test_continuous_motion_answers_error() {
        let mut s = slave();
        send(
            &mut s,
            Command::Move {
                direction: Drive::Forward,
                speed: 100,
            },
            8,
        );

        let response = run_until_response(&mut s, 4);
        assert_eq!(response, ResponsePacket::new(8, Status::Error));
        assert_eq!(s.motion().mode(), MotionMode::OpenLoopMove);

        send(&mut s, Command::Stop, 9);
        let response = run_until_response(&mut s, 4);
        assert_eq!(response, ResponsePacket::new(9, Status::Ok));
        assert!(s.motion().is_stopped());
    }

    #[test]
    fn test_move_to_zero_settles_ok() {
        let mut s = slave();
        send(&mut s, Command::MoveTo { cm: 0 }, 11);

        s.poll();
        assert_eq!(s.phase(), Phase::Maneuvering { updates: 0 });

        let response = run_until_response(&mut s, 2000);
        assert_eq!(response, ResponsePacket::new(11, Status::Ok));
    }

    #[test]
    fn test_commands_queue_during_maneuver() {
        let mut s = slave();
        send(&mut s, Command::MoveTo { cm: 0 }, 11);
        s.poll();

        send(&mut s, Command::ClearScreen, 12);
        for _ in 0..10 {
            s.poll();
        }
        assert!(s.graphics().calls.is_empty());
        assert!(matches!(s.phase(), Phase::Maneuvering { .. }));

        // The queued command makes the maneuver's answer an error
        let first = run_until_response(&mut s, 2000);
        assert_eq!(first, ResponsePacket::new(11, Status::Error));

        let second = run_until_response(&mut s, 4);
        assert_eq!(second, ResponsePacket::new(12, Status::Ok));
        assert_eq!(s.graphics().calls.as_slice(), &[Drawn::Clear]);
    }

    #[test]
    fn test_maneuver_budget() {
        let mut config = RobotConfig::default();
        config.drive.maneuver_budget = 50;
        let mut s = slave_with(config);

        // The wheels never turn, so this cannot settle
        send(&mut s, Command::MoveTo { cm: 30 }, 21);
        let response = run_until_response(&mut s, 100);

        assert_eq!(response, ResponsePacket::new(21, Status::Error));
        assert!(s.motion().is_stopped());
        assert_eq!(s.motion().motors().0.output, 0.0);
    }

    #[test]
    fn test_rotate_to_dispatch() {
        let mut s = slave();
        send(&mut s, Command::RotateTo { degrees: 90 }, 2);
        s.poll();

        assert_eq!(s.motion().mode(), MotionMode::RotateToAngle);
        assert_eq!(s.motion().targets(), (1018, -1018));
    }

    #[test]
    fn test_invalid_direction_dropped() {
        let mut s = slave();
        s.target
            .push(&CommandPacket::new(4, 0x31, [55, 200, 0, 0, 0, 0]).encode());

        let response = run_until_response(&mut s, 4);
        assert_eq!(response, ResponsePacket::new(4, Status::Ok));
        assert!(s.motion().is_stopped());
    }
}
