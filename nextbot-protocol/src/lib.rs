//! NextBot Master/Slave Protocol
//!
//! This crate defines the byte-level protocol between the master controller
//! and the slave controller (drive train + display). The master is the only
//! bus initiator; every command it writes is answered by exactly one
//! response that the master reads back.
//!
//! # Protocol Overview
//!
//! Three fixed-size packets, each framed by a start and an end marker:
//! ```text
//! Command  (10B): ┌──────┬────┬────────┬──────────────┬──────┐
//!                 │ 0x55 │ ID │ OPCODE │ PARAMS (6B)  │ 0x99 │
//!                 └──────┴────┴────────┴──────────────┴──────┘
//! Response  (4B): ┌──────┬────┬────────┬──────┐
//!                 │ 0xAA │ ID │ STATUS │ 0x11 │
//!                 └──────┴────┴────────┴──────┘
//! Data     (20B): ┌──────┬──────────────────┬──────┐
//!                 │ 0xDD │ TEXT (18B, NUL)  │ 0xEE │
//!                 └──────┴──────────────────┴──────┘
//! ```
//!
//! The ID is a correlation token chosen by the master; the response echoes
//! it. There is no checksum and no retransmission at this layer: a marker
//! mismatch is reported to the caller, who decides whether to go on.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod messages;
pub mod opcode;
pub mod packet;

pub use messages::{Command, Drive};
pub use opcode::Opcode;
pub use packet::{
    CommandPacket, DataPacket, Decoded, FrameError, ResponsePacket, Status, COMMAND_LEN,
    DATA_LEN, MAX_TEXT_LEN, PARAM_LEN, RESPONSE_LEN,
};
