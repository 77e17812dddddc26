//! Typed USB packets and the codec that moves them to and from the wire
//! (USB 1.1 §8.4).

use crate::bits::BitVec;
use crate::error::DecodeError;
use crate::symbol::SymbolStream;

/// Fixed SYNC bit literal: under NRZI starting from idle `J` this produces
/// the `K J K J K J K K` symbol preamble (USB 1.1 §7.1.10).
const SYNC_BITS: &str = "0000_0001";

/// Token packet kind (USB 1.1 §8.4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Setup,
    Out,
    In,
}

impl TokenKind {
    fn pid_literal(self) -> &'static str {
        match self {
            TokenKind::Setup => "1011_0100",
            TokenKind::Out => "1000_0111",
            TokenKind::In => "1001_0110",
        }
    }
}

/// Data packet kind, distinguishing the alternating data-toggle values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    Data0,
    Data1,
}

impl DataKind {
    fn pid_literal(self) -> &'static str {
        match self {
            DataKind::Data0 => "1100_0011",
            DataKind::Data1 => "1101_0010",
        }
    }
}

/// Handshake packet kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeKind {
    Ack,
    Nak,
}

impl HandshakeKind {
    fn pid_literal(self) -> &'static str {
        match self {
            HandshakeKind::Ack => "0100_1011",
            HandshakeKind::Nak => "0101_1010",
        }
    }
}

/// A fully typed USB packet (USB 1.1 §8.4). A flat tagged sum type rather
/// than a class hierarchy per packet kind: the encoder dispatches on the
/// variant and the decoder tries each PID in turn, returning by value
/// instead of a heap-allocated polymorphic object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    /// A SETUP/OUT/IN token addressed to a device and endpoint.
    Token {
        kind: TokenKind,
        addr: u8,
        endp: u8,
    },
    /// A DATA0/DATA1 packet carrying a byte payload.
    Data { kind: DataKind, payload: Vec<u8> },
    /// An ACK/NAK handshake.
    Handshake(HandshakeKind),
}

/// Minimum symbol-stream length (SYNC + PID, before EOP) below which
/// decoding cannot possibly succeed: a handshake is the shortest packet
/// kind at 8 (SYNC) + 8 (PID) = 16 bits, which after NRZI/stuffing expands
/// to at least 16 symbols (stuffing only ever adds symbols).
const MIN_SYMBOLS_AFTER_EOP_STRIP: usize = 16;

/// Encodes typed [`Packet`]s to the wire and decodes wire streams back into
/// typed packets (USB 1.1 §8.4). Stateless: every call is independent, so
/// this is a zero-sized marker type rather than a struct with fields.
pub struct PacketCodec;

impl PacketCodec {
    /// Encodes `packet` into a complete symbol stream, SYNC through EOP.
    pub fn encode(packet: &Packet) -> SymbolStream {
        let bits = match packet {
            Packet::Token { kind, addr, endp } => Self::token_bits(kind.pid_literal(), *addr, *endp),
            Packet::Data { kind, payload } => Self::data_bits(kind.pid_literal(), payload),
            Packet::Handshake(kind) => Self::handshake_bits(kind.pid_literal()),
        };

        let mut stream = SymbolStream::from_bits(&bits);
        stream.append_eop();
        stream
    }

    fn token_bits(pid_literal: &str, addr: u8, endp: u8) -> BitVec {
        let mut bits = BitVec::from_literal(SYNC_BITS);
        bits.extend(&BitVec::from_literal(pid_literal));

        let mut payload = BitVec::from_uint(addr as u32, 7);
        payload.extend(&BitVec::from_uint(endp as u32, 4));

        let crc = payload.calc_crc5();
        let mut crc_bits = BitVec::from_uint(crc as u32, 5);
        crc_bits = crc_bits.reversed_range(0, 5);

        bits.extend(&payload);
        bits.extend(&crc_bits);
        bits
    }

    fn data_bits(pid_literal: &str, payload: &[u8]) -> BitVec {
        let mut bits = BitVec::from_literal(SYNC_BITS);
        bits.extend(&BitVec::from_literal(pid_literal));

        let mut payload_bits = BitVec::new();
        for &byte in payload {
            payload_bits.extend(&BitVec::from_uint(byte as u32, 8));
        }

        let crc = payload_bits.calc_crc16();
        let mut crc_bits = BitVec::from_uint(crc as u32, 16);
        crc_bits = crc_bits.reversed_range(0, 16);

        bits.extend(&payload_bits);
        bits.extend(&crc_bits);
        bits
    }

    fn handshake_bits(pid_literal: &str) -> BitVec {
        let mut bits = BitVec::from_literal(SYNC_BITS);
        bits.extend(&BitVec::from_literal(pid_literal));
        bits
    }

    /// Attempts to decode a complete symbol stream (SYNC through EOP) back
    /// into a typed [`Packet`].
    ///
    /// Trial order is ACK, NAK, DATA0, DATA1: tokens are host-to-device
    /// only, so the receive path here — which only ever observes device
    /// responses — does not attempt to decode them.
    pub fn try_decode(stream: &SymbolStream) -> Result<Packet, DecodeError> {
        if !stream.starts_with_sync() {
            return Err(DecodeError::MissingSync);
        }
        if !stream.ends_with_eop() {
            return Err(DecodeError::MissingEop);
        }
        if stream.len() < MIN_SYMBOLS_AFTER_EOP_STRIP + 3 {
            return Err(DecodeError::TooShort(stream.len()));
        }

        let mut stripped = stream.clone();
        stripped.strip_eop();
        let bits = stripped.to_bits()?;

        if bits.len() < 16 {
            return Err(DecodeError::TooShort(bits.len()));
        }

        let pid = bits.extract_uint(8, 16) as u8;

        for kind in [HandshakeKind::Ack, HandshakeKind::Nak] {
            if pid_matches(kind.pid_literal(), pid) {
                return Ok(Packet::Handshake(kind));
            }
        }

        for kind in [DataKind::Data0, DataKind::Data1] {
            if pid_matches(kind.pid_literal(), pid) {
                return Self::decode_data(kind, &bits);
            }
        }

        log::warn!("decode failure: unknown PID {:#010b}", pid);
        Err(DecodeError::UnknownPid(pid))
    }

    fn decode_data(kind: DataKind, bits: &BitVec) -> Result<Packet, DecodeError> {
        let total = bits.len();
        if total < 16 + 16 {
            return Err(DecodeError::TooShort(total));
        }

        let payload_bit_len = total - 16 - 16;
        if payload_bit_len % 8 != 0 {
            return Err(DecodeError::UnalignedPayload(payload_bit_len));
        }

        let payload_end = 16 + payload_bit_len;
        let mut payload = Vec::with_capacity(payload_bit_len / 8);
        let mut pos = 16;
        while pos < payload_end {
            payload.push(bits.extract_uint(pos, pos + 8) as u8);
            pos += 8;
        }

        log::trace!("decoded {:?} payload of {} bytes", kind, payload.len());
        Ok(Packet::Data { kind, payload })
    }
}

/// Compares an 8-bit field against a lsb-first PID literal.
fn pid_matches(pid_literal: &str, pid: u8) -> bool {
    BitVec::from_uint(pid as u32, 8).iter().collect::<Vec<_>>()
        == BitVec::from_literal(pid_literal).iter().collect::<Vec<_>>()
}
