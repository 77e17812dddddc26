//! A [sans-I/O](https://sans-io.readthedocs.io/how-to-sans-io.html) codec
//! for the USB 1.x low/full-speed line-level protocol, for feeding
//! bit-level symbols into a simulated device and reassembling its
//! responses. This crate implements the packet codec layer only: it
//! converts between typed USB packets (SETUP/IN/OUT tokens, DATA0/DATA1,
//! ACK/NAK handshakes) and a stream of line-state symbols (`J`, `K`, `SE0`,
//! `SE1`), including synchronization preamble, PID, CRC5/CRC16, bit-
//! stuffing, NRZI encoding, and end-of-packet framing.
//!
//! The device-under-test itself (a logic simulator), any test harnesses
//! built on top, and the firmware running inside a simulated device are
//! external collaborators; only their interface contracts are modelled
//! here, through the [`line::Device`] trait.
//!
//! Non-goals: USB high-speed (480 Mbps), split transactions, isochronous
//! scheduling, SOF frames, bus reset/suspend timing, and physical
//! electrical signalling. This is a protocol-level codec, not an analog
//! model.
//!
//! Common abbreviations:
//!
//! - PID: packet identifier;
//! - NRZI: non-return-to-zero inverted;
//! - EOP: end-of-packet;
//! - lsb: least-significant bit.

pub mod bits;
pub mod config;
pub mod error;
pub mod line;
pub mod packet;
pub mod symbol;
pub mod trace;
pub mod transaction;

pub use bits::BitVec;
pub use config::CodecConfig;
pub use error::{DecodeError, TransferError};
pub use line::{Device, LineDriver};
pub use packet::{DataKind, HandshakeKind, Packet, PacketCodec, TokenKind};
pub use symbol::{Symbol, SymbolStream};
pub use trace::{CsvTraceSink, TraceSink};
pub use transaction::TransactionHelpers;
