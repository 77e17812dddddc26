//! Control-transfer convenience routines built on [`crate::line::LineDriver`]
//! and [`crate::packet::PacketCodec`] (USB 1.1 §8.5.3, control transfers).

use crate::config::CodecConfig;
use crate::error::TransferError;
use crate::line::{Device, LineDriver};
use crate::packet::{DataKind, HandshakeKind, Packet, PacketCodec, TokenKind};

/// Sequences the SETUP/DATA/STATUS stages of a USB control transfer on top
/// of a [`LineDriver`].
///
/// A device may legitimately NAK a data stage indefinitely; this crate
/// bounds every such retry loop at [`CodecConfig::nak_retry_cap`] so a
/// faulty device cannot hang a caller indefinitely.
pub struct TransactionHelpers<'a, D: Device> {
    driver: LineDriver<'a, D>,
    config: CodecConfig,
}

impl<'a, D: Device> TransactionHelpers<'a, D> {
    /// Wraps an existing [`LineDriver`].
    pub fn new(driver: LineDriver<'a, D>, config: CodecConfig) -> Self {
        TransactionHelpers { driver, config }
    }

    /// Runs a full control transfer addressed to `dev_addr`, endpoint 0.
    ///
    /// `setup` is the 8-byte SETUP packet payload (bmRequestType, bRequest,
    /// wValue, wIndex, wLength, little-endian per the USB specification).
    /// For an IN transfer, received data is appended to `data_buf` and the
    /// number of bytes transferred is returned. For an OUT transfer, only
    /// the status stage is performed (this crate does not implement an OUT
    /// data stage), and the return value is always `0`.
    pub fn control_transfer(
        &mut self,
        dev_addr: u8,
        setup: [u8; 8],
        data_buf: &mut Vec<u8>,
    ) -> Result<usize, TransferError> {
        self.send_token(TokenKind::Setup, dev_addr, 0);
        self.send_data(DataKind::Data0, &setup);
        self.await_ack("setup")?;

        let is_in = setup[0] & 0x80 != 0;
        let w_length = u16::from_le_bytes([setup[6], setup[7]]) as usize;

        if is_in {
            self.read_data_stage(dev_addr, w_length, data_buf)
        } else {
            self.status_stage_in(dev_addr)?;
            Ok(0)
        }
    }

    fn read_data_stage(
        &mut self,
        dev_addr: u8,
        w_length: usize,
        data_buf: &mut Vec<u8>,
    ) -> Result<usize, TransferError> {
        let mut toggle = DataKind::Data1;
        let mut total = 0usize;

        loop {
            let payload = self.await_data_in(dev_addr, toggle)?;
            self.send_handshake(HandshakeKind::Ack);

            let short_packet = payload.len() < self.config.max_packet_size;
            total += payload.len();
            data_buf.extend_from_slice(&payload);
            toggle = flip(toggle);

            if total >= w_length || short_packet {
                break;
            }
        }

        self.status_stage_out(dev_addr)?;
        Ok(total)
    }

    /// Zero-length DATA1 OUT status stage, awaiting ACK (used to close an
    /// IN control transfer).
    fn status_stage_out(&mut self, dev_addr: u8) -> Result<(), TransferError> {
        self.send_token(TokenKind::Out, dev_addr, 0);
        self.send_data(DataKind::Data1, &[]);
        self.await_ack("status")
    }

    /// IN status stage expecting a zero-length DATA1, then ACKing it (used
    /// to close an OUT control transfer; USB 1.1 §8.5.3).
    fn status_stage_in(&mut self, dev_addr: u8) -> Result<(), TransferError> {
        let payload = self.await_data_in(dev_addr, DataKind::Data1)?;
        self.send_handshake(HandshakeKind::Ack);
        if !payload.is_empty() {
            return Err(TransferError::UnexpectedResponse { stage: "status" });
        }
        Ok(())
    }

    /// Sends an IN token and retries on NAK, up to [`CodecConfig::nak_retry_cap`]
    /// attempts, until a DATA packet with the expected toggle is observed
    /// (USB 1.1 §8.5.3, data stage).
    fn await_data_in(&mut self, dev_addr: u8, expected: DataKind) -> Result<Vec<u8>, TransferError> {
        for _ in 0..self.config.nak_retry_cap {
            self.send_token(TokenKind::In, dev_addr, 0);
            let resp = self.driver.try_receive(self.config.max_idle_symbols);
            if resp.is_empty() {
                log::trace!("await_data_in: no response, retrying");
                continue;
            }

            match PacketCodec::try_decode(&resp) {
                Ok(Packet::Handshake(HandshakeKind::Nak)) => continue,
                Ok(Packet::Data { kind, payload }) if kind == expected => return Ok(payload),
                Ok(other) => {
                    log::warn!("await_data_in: unexpected response {:?}", other);
                    return Err(TransferError::UnexpectedResponse { stage: "data-in" });
                }
                Err(e) => {
                    log::warn!("await_data_in: decode failure {:?}", e);
                    continue;
                }
            }
        }

        Err(TransferError::RetryBudgetExhausted(self.config.nak_retry_cap))
    }

    /// Polls for an ACK up to [`CodecConfig::setup_ack_timeout`] attempts
    /// (USB 1.1 §8.5.3, setup stage).
    fn await_ack(&mut self, stage: &'static str) -> Result<(), TransferError> {
        for _ in 0..self.config.setup_ack_timeout {
            let resp = self.driver.try_receive(self.config.max_idle_symbols);
            if resp.is_empty() {
                continue;
            }

            match PacketCodec::try_decode(&resp) {
                Ok(Packet::Handshake(HandshakeKind::Ack)) => return Ok(()),
                Ok(_) | Err(_) => continue,
            }
        }

        log::warn!("{} stage timed out waiting for ACK", stage);
        Err(TransferError::SetupTimeout(self.config.setup_ack_timeout))
    }

    fn send_token(&mut self, kind: TokenKind, addr: u8, endp: u8) {
        self.send_packet(&Packet::Token { kind, addr, endp });
    }

    fn send_data(&mut self, kind: DataKind, payload: &[u8]) {
        self.send_packet(&Packet::Data {
            kind,
            payload: payload.to_vec(),
        });
    }

    fn send_handshake(&mut self, kind: HandshakeKind) {
        self.send_packet(&Packet::Handshake(kind));
    }

    fn send_packet(&mut self, packet: &Packet) {
        let stream = PacketCodec::encode(packet);
        for sym in stream.iter() {
            self.driver.clock_symbol(sym);
        }
    }
}

fn flip(kind: DataKind) -> DataKind {
    match kind {
        DataKind::Data0 => DataKind::Data1,
        DataKind::Data1 => DataKind::Data0,
    }
}
