//! Master-side communicator
//!
//! Strictly one command in flight: `execute` writes a command, waits the
//! slave's turnaround time, then polls for the response. A failed exchange
//! leaves the command marked outstanding until a later exchange succeeds.
//! There is no automatic retry.

use embedded_hal::delay::DelayNs;
use nextbot_hal::I2cBus;
use nextbot_protocol::packet::RESPONSE_START;
use nextbot_protocol::{
    Command, DataPacket, Drive, ResponsePacket, Status, MAX_TEXT_LEN, RESPONSE_LEN,
};

use super::error::CommsError;
use super::id::IdGenerator;
use crate::config::CommsConfig;

/// Bus master talking to one slave
pub struct Master<B, D> {
    bus: B,
    delay: D,
    config: CommsConfig,
    ids: IdGenerator,
    last_id: u8,
    outstanding: bool,
}

impl<B: I2cBus, D: DelayNs> Master<B, D> {
    /// Create a master; `seed` initializes the correlation id sequence
    pub fn new(bus: B, delay: D, config: &CommsConfig, seed: u32) -> Self {
        Self {
            bus,
            delay,
            config: *config,
            ids: IdGenerator::new(seed),
            last_id: 0,
            outstanding: false,
        }
    }

    /// Id of the most recently sent command
    pub fn last_id(&self) -> u8 {
        self.last_id
    }

    /// Check whether the last command has not been acknowledged yet
    pub fn is_outstanding(&self) -> bool {
        self.outstanding
    }

    /// Give the bus and delay back
    pub fn release(self) -> (B, D) {
        (self.bus, self.delay)
    }

    /// Write a command, returning its correlation id
    ///
    /// `DrawText` needs its text and is refused with
    /// [`CommsError::MissingText`]; use [`Master::draw_text`] for it.
    pub fn send_command(&mut self, command: &Command) -> Result<u8, CommsError> {
        if *command == Command::DrawText {
            return Err(CommsError::MissingText);
        }
        self.write_command(command)
    }

    fn write_command(&mut self, command: &Command) -> Result<u8, CommsError> {
        let id = self.ids.next_id();
        let bytes = command.to_packet(id).encode();

        self.bus
            .write(self.config.address, &bytes)
            .map_err(|_| CommsError::Bus)?;
        trace!("sent {} as id {}", command, id);

        self.last_id = id;
        self.outstanding = true;
        self.delay.delay_ms(self.config.turnaround_ms);
        Ok(id)
    }

    /// Poll for the response to the last command
    ///
    /// A bus error while polling counts as "not ready yet".
    pub fn receive_response(&mut self) -> Result<(), CommsError> {
        for _ in 0..self.config.poll_attempts {
            let mut buf = [0u8; RESPONSE_LEN];
            if self.bus.read(self.config.address, &mut buf).is_ok() && buf[0] == RESPONSE_START {
                return self.accept(&buf);
            }
            self.delay.delay_ms(self.config.poll_interval_ms);
        }

        warn!("no response to id {}", self.last_id);
        Err(CommsError::Timeout)
    }

    /// Send a command and wait for its acknowledgement
    pub fn execute(&mut self, command: &Command) -> Result<(), CommsError> {
        self.send_command(command)?;
        self.receive_response()
    }

    fn accept(&mut self, buf: &[u8; RESPONSE_LEN]) -> Result<(), CommsError> {
        let decoded = ResponsePacket::decode(buf);
        if let Some(fault) = decoded.fault {
            warn!("response framing: {}", fault);
        }
        let response = decoded.packet;

        if response.id != self.last_id {
            warn!(
                "response id mismatch: expected {}, found {}",
                self.last_id,
                response.id
            );
            return Err(CommsError::Mismatch {
                expected: self.last_id,
                found: response.id,
            });
        }
        if response.status != Status::Ok {
            warn!("command {} rejected", response.id);
            return Err(CommsError::Rejected { id: response.id });
        }

        self.outstanding = false;
        Ok(())
    }

    /// Print text on the slave's display
    ///
    /// Texts longer than a data packet are refused before anything is sent.
    pub fn draw_text(&mut self, text: &str) -> Result<(), CommsError> {
        if text.len() > MAX_TEXT_LEN {
            return Err(CommsError::TextTooLong);
        }

        self.write_command(&Command::DrawText)?;
        let data = DataPacket::from_text(text).encode();
        self.bus
            .write(self.config.address, &data)
            .map_err(|_| CommsError::Bus)?;
        self.receive_response()
    }

    /// Set one pixel
    pub fn draw_point(&mut self, x: u8, y: u8) -> Result<(), CommsError> {
        self.execute(&Command::DrawPoint { x, y })
    }

    /// Draw a line between two points
    pub fn draw_line(&mut self, x0: u8, y0: u8, x1: u8, y1: u8) -> Result<(), CommsError> {
        self.execute(&Command::DrawLine { x0, y0, x1, y1 })
    }

    /// Draw a circle outline around `(x, y)`
    pub fn draw_circle(&mut self, x: u8, y: u8, radius: u8) -> Result<(), CommsError> {
        self.execute(&Command::DrawCircle { x, y, radius })
    }

    /// Draw a filled circle around `(x, y)`
    pub fn draw_disc(&mut self, x: u8, y: u8, radius: u8) -> Result<(), CommsError> {
        self.execute(&Command::DrawDisc { x, y, radius })
    }

    /// Draw a triangle outline
    pub fn draw_triangle(
        &mut self,
        x0: u8,
        y0: u8,
        x1: u8,
        y1: u8,
        x2: u8,
        y2: u8,
    ) -> Result<(), CommsError> {
        self.execute(&Command::DrawTriangle {
            x0,
            y0,
            x1,
            y1,
            x2,
            y2,
        })
    }

    /// Draw a rectangle outline with its top-left corner at `(x, y)`
    pub fn draw_rectangle(&mut self, x: u8, y: u8, width: u8, height: u8) -> Result<(), CommsError> {
        self.execute(&Command::DrawRectangle {
            x,
            y,
            width,
            height,
        })
    }

    /// Draw a filled rectangle with its top-left corner at `(x, y)`
    pub fn draw_box(&mut self, x: u8, y: u8, width: u8, height: u8) -> Result<(), CommsError> {
        self.execute(&Command::DrawBox {
            x,
            y,
            width,
            height,
        })
    }

    /// Blank the display and move text back to the top line
    pub fn clear_screen(&mut self) -> Result<(), CommsError> {
        self.execute(&Command::ClearScreen)
    }

    /// Run the left wheel at a fixed speed
    pub fn left_motor(&mut self, direction: Drive, speed: u8) -> Result<(), CommsError> {
        self.execute(&Command::LeftMotor { direction, speed })
    }

    /// Run the right wheel at a fixed speed
    pub fn right_motor(&mut self, direction: Drive, speed: u8) -> Result<(), CommsError> {
        self.execute(&Command::RightMotor { direction, speed })
    }

    /// Start continuous straight motion
    pub fn move_robot(&mut self, direction: Drive, speed: u8) -> Result<(), CommsError> {
        self.execute(&Command::Move { direction, speed })
    }

    /// Drive `cm` centimetres; returns once the slave has settled
    pub fn move_to(&mut self, cm: i16) -> Result<(), CommsError> {
        self.execute(&Command::MoveTo { cm })
    }

    /// Stop both wheels
    pub fn stop(&mut self) -> Result<(), CommsError> {
        self.execute(&Command::Stop)
    }

    /// Start spinning in place
    pub fn turn(&mut self, direction: Drive, speed: u8) -> Result<(), CommsError> {
        self.execute(&Command::Turn { direction, speed })
    }

    /// Rotate by `degrees`; returns once the slave has settled
    pub fn rotate_to(&mut self, degrees: i16) -> Result<(), CommsError> {
        self.execute(&Command::RotateTo { degrees })
    }
}
