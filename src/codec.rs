// SMPP v3.4 Codec - Separates parsing/encoding logic from domain models
//
// This module provides a clean separation between the wire format (codec)
// and the domain models (PDUs). Each PDU implements Encodable/Decodable traits
// rather than having all parsing logic in a monolithic frame parser.

use crate::datatypes::{CommandId, CommandStatus};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::collections::HashMap;
use std::io::Cursor;
use thiserror::Error;

// Frame and registry types are defined in this file

/// Maximum allowed PDU size to prevent memory exhaustion attacks
pub const MAX_PDU_SIZE: u32 = 65536; // 64KB

/// SMPP v3.4 PDU Header (16 bytes, common to all PDUs)
#[derive(Debug, Clone, PartialEq)]
pub struct PduHeader {
    pub command_length: u32,
    pub command_id: CommandId,
    pub command_status: CommandStatus,
    pub sequence_number: u32,
}

impl PduHeader {
    pub const SIZE: usize = 16;

    /// Decode PDU header from buffer with validation
    pub fn decode(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        if buf.remaining() < Self::SIZE {
            return Err(CodecError::Incomplete);
        }

        let command_length = buf.get_u32();
        let command_id_raw = buf.get_u32();
        let command_id = CommandId::try_from(command_id_raw)
            .map_err(|_| CodecError::InvalidCommandId(command_id_raw))?;
        let command_status = CommandStatus::try_from(buf.get_u32())
            .map_err(|_| CodecError::InvalidCommandStatus(buf.get_u32()))?;
        let sequence_number = buf.get_u32();

        // Validate PDU size constraints
        if command_length < Self::SIZE as u32 {
            return Err(CodecError::InvalidPduLength {
                length: command_length,
                min: Self::SIZE as u32,
                max: MAX_PDU_SIZE,
            });
        }

        if command_length > MAX_PDU_SIZE {
            return Err(CodecError::InvalidPduLength {
                length: command_length,
                min: Self::SIZE as u32,
                max: MAX_PDU_SIZE,
            });
        }

        // Validate SMPP v3.4 rule: requests must have command_status = 0
        if !command_id.is_response() && command_status != CommandStatus::Ok {
            return Err(CodecError::InvalidRequestStatus {
                command_id,
                command_status,
            });
        }

        // Validate reserved sequence numbers
        if sequence_number == 0 || sequence_number == 0xFFFFFFFF {
            return Err(CodecError::ReservedSequenceNumber(sequence_number));
        }

        Ok(PduHeader {
            command_length,
            command_id,
            command_status,
            sequence_number,
        })
    }

    /// Encode PDU header to buffer
    pub fn encode(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        buf.put_u32(self.command_length);
        buf.put_u32(self.command_id as u32);
        buf.put_u32(self.command_status as u32);
        buf.put_u32(self.sequence_number);
        Ok(())
    }
}

/// Trait for types that can be encoded to bytes
pub trait Encodable {
    /// Encode this PDU to the buffer
    fn encode(&self, buf: &mut BytesMut) -> Result<(), CodecError>;

    /// Calculate the encoded size without actually encoding
    fn encoded_size(&self) -> usize {
        let mut buf = BytesMut::new();
        self.encode(&mut buf).map(|_| buf.len()).unwrap_or(0)
    }

    /// Convert this PDU to bytes (convenience method)
    ///
    /// This is a default implementation that creates a buffer, encodes into it,
    /// fixes the command_length field, and returns the frozen bytes. This replaces the legacy ToBytes trait.
    fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::new();
        self.encode(&mut buf)
            .expect("Encoding should not fail for valid PDU");

        // Fix the command_length field in the header (first 4 bytes)
        if buf.len() >= 4 {
            let length = buf.len() as u32;
            buf[0..4].copy_from_slice(&length.to_be_bytes());
        }

        buf.freeze()
    }
}

/// Trait for types that can be decoded from bytes
pub trait Decodable: Sized {
    /// Decode this PDU from the buffer after header
    fn decode(header: PduHeader, buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError>;

    /// Return the expected command_id for this PDU type
    fn command_id() -> CommandId;

    /// Validate the header is appropriate for this PDU type
    fn validate_header(header: &PduHeader) -> Result<(), CodecError> {
        if header.command_id != Self::command_id() {
            return Err(CodecError::UnexpectedCommandId {
                expected: Self::command_id(),
                actual: header.command_id,
            });
        }
        Ok(())
    }
}

/// Codec errors with detailed context for debugging
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Incomplete PDU: need more data")]
    Incomplete,

    #[error("Invalid command_id: {0:#x}")]
    InvalidCommandId(u32),

    #[error("Invalid command_status: {0:#x}")]
    InvalidCommandStatus(u32),

    #[error("Invalid PDU length: {length}, must be {min}-{max}")]
    InvalidPduLength { length: u32, min: u32, max: u32 },

    #[error("Request PDU {command_id:?} has non-zero status: {command_status:?}")]
    InvalidRequestStatus {
        command_id: CommandId,
        command_status: CommandStatus,
    },

    #[error("Reserved sequence number: {0} (0 and 0xFFFFFFFF are reserved)")]
    ReservedSequenceNumber(u32),

    #[error("Unexpected command_id: expected {expected:?}, got {actual:?}")]
    UnexpectedCommandId {
        expected: CommandId,
        actual: CommandId,
    },

    #[error("Field '{field}' validation failed: {reason}")]
    FieldValidation { field: &'static str, reason: String },

    #[error("TLV parsing error: {0}")]
    TlvError(String),

    #[error("UTF-8 decoding error in field '{field}': {source}")]
    Utf8Error {
        field: &'static str,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Lets `Frame::parse`/`Frame::check` (the `connection.rs`-facing legacy
/// compatibility surface) report codec failures through the older
/// `frame::Error` type without the caller needing to know two error types
/// exist.
impl From<CodecError> for crate::frame::Error {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Incomplete => crate::frame::Error::Incomplete,
            other => crate::frame::Error::Other(Box::new(other)),
        }
    }
}

impl CommandId {
    /// Check if this command_id represents a response PDU
    pub fn is_response(&self) -> bool {
        (*self as u32) & 0x8000_0000 != 0
    }
}

/// Convert codec errors to appropriate SMPP command_status codes
impl CodecError {
    pub fn to_command_status(&self) -> CommandStatus {
        match self {
            CodecError::InvalidPduLength { .. } => CommandStatus::InvalidCommandLength,
            CodecError::InvalidCommandId(_) => CommandStatus::InvalidCommandId,
            CodecError::FieldValidation { field, .. } => {
                // Map specific field errors to appropriate status codes
                match *field {
                    "source_addr" | "destination_addr" => CommandStatus::InvalidSourceAddress,
                    "short_message" => CommandStatus::InvalidMsgLength,
                    _ => CommandStatus::SystemError,
                }
            }
            CodecError::TlvError(_) => CommandStatus::SystemError, // Could add specific TLV error code
            _ => CommandStatus::SystemError,
        }
    }
}

/// Utility functions for decoding common SMPP field types
pub fn decode_cstring(
    buf: &mut Cursor<&[u8]>,
    max_len: usize,
    field_name: &'static str,
) -> Result<String, CodecError> {
    if buf.remaining() < max_len {
        return Err(CodecError::Incomplete);
    }

    // Read the fixed-size field
    let field_bytes = buf.copy_to_bytes(max_len);

    // Find null terminator or use entire field
    let end = field_bytes
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(field_bytes.len());

    // Convert to string, handling potential non-UTF8 data gracefully
    String::from_utf8(field_bytes[..end].to_vec()).map_err(|e| CodecError::Utf8Error {
        field: field_name,
        source: e,
    })
}

/// Decode a single byte
pub fn decode_u8(buf: &mut Cursor<&[u8]>) -> Result<u8, CodecError> {
    if buf.remaining() < 1 {
        return Err(CodecError::Incomplete);
    }
    Ok(buf.get_u8())
}

/// Decode a 16-bit big-endian integer
pub fn decode_u16(buf: &mut Cursor<&[u8]>) -> Result<u16, CodecError> {
    if buf.remaining() < 2 {
        return Err(CodecError::Incomplete);
    }
    Ok(buf.get_u16())
}

/// Decode a 32-bit big-endian integer
pub fn decode_u32(buf: &mut Cursor<&[u8]>) -> Result<u32, CodecError> {
    if buf.remaining() < 4 {
        return Err(CodecError::Incomplete);
    }
    Ok(buf.get_u32())
}

/// Peek at next 4 bytes without advancing cursor (for command_length)
pub fn peek_u32(buf: &mut Cursor<&[u8]>) -> Result<u32, CodecError> {
    if buf.remaining() < 4 {
        return Err(CodecError::Incomplete);
    }

    let pos = buf.position();
    let value = buf.get_u32();
    buf.set_position(pos); // Reset position
    Ok(value)
}

/// Utility functions for encoding common SMPP field types
pub fn encode_cstring(buf: &mut BytesMut, value: &str, max_len: usize) {
    let bytes = value.as_bytes();
    let actual_len = bytes.len().min(max_len - 1); // Reserve space for null terminator

    // Write the string content
    buf.put_slice(&bytes[..actual_len]);

    // Add null terminator
    buf.put_u8(0);

    // Pad with zeros to reach max_len
    let padding_needed = max_len - actual_len - 1;
    for _ in 0..padding_needed {
        buf.put_u8(0);
    }
}

/// Encode a single byte
pub fn encode_u8(buf: &mut BytesMut, value: u8) {
    buf.put_u8(value);
}

/// Encode a 16-bit big-endian integer
pub fn encode_u16(buf: &mut BytesMut, value: u16) {
    buf.put_u16(value);
}

/// Encode a 32-bit big-endian integer
pub fn encode_u32(buf: &mut BytesMut, value: u32) {
    buf.put_u32(value);
}

/// Generic frame type that can hold any PDU
#[derive(Debug)]
pub enum Frame {
    // Keep-alive PDUs
    EnquireLink(crate::datatypes::EnquireLink),
    EnquireLinkResp(crate::datatypes::EnquireLinkResponse),

    // Session management PDUs
    Unbind(crate::datatypes::Unbind),
    UnbindResp(crate::datatypes::UnbindResponse),

    // Bind PDUs
    BindReceiver(crate::datatypes::BindReceiver),
    BindReceiverResp(crate::datatypes::BindReceiverResponse),
    BindTransceiver(crate::datatypes::BindTransceiver),
    BindTransceiverResp(crate::datatypes::BindTransceiverResponse),
    BindTransmitter(crate::datatypes::BindTransmitter),
    BindTransmitterResp(crate::datatypes::BindTransmitterResponse),

    // Message PDUs
    SubmitSm(Box<crate::datatypes::SubmitSm>),
    SubmitSmResp(crate::datatypes::SubmitSmResponse),
    SubmitMulti(Box<crate::datatypes::SubmitMulti>),
    SubmitMultiResp(crate::datatypes::SubmitMultiResponse),
    QuerySm(crate::datatypes::QuerySm),
    QuerySmResp(crate::datatypes::QuerySmResponse),
    ReplaceSm(Box<crate::datatypes::ReplaceSm>),
    ReplaceSmResp(crate::datatypes::ReplaceSmResponse),
    CancelSm(crate::datatypes::CancelSm),
    CancelSmResp(crate::datatypes::CancelSmResponse),
    DataSm(Box<crate::datatypes::DataSm>),
    DataSmResp(crate::datatypes::DataSmResponse),
    DeliverSm(Box<crate::datatypes::DeliverSm>),
    DeliverSmResp(crate::datatypes::DeliverSmResponse),

    // Notification PDUs
    AlertNotification(crate::datatypes::AlertNotification),

    // Special PDUs
    GenericNack(crate::datatypes::GenericNack),
    Outbind(crate::datatypes::Outbind),

    // For unknown PDUs (forward compatibility)
    Unknown { header: PduHeader, body: Bytes },
}

/// Registry of PDU decoders for extensible parsing
type DecoderFn =
    Box<dyn Fn(PduHeader, &mut Cursor<&[u8]>) -> Result<Frame, CodecError> + Send + Sync>;

pub struct PduRegistry {
    decoders: HashMap<CommandId, DecoderFn>,
}

impl PduRegistry {
    /// Create a new registry with standard SMPP v3.4 PDUs registered
    pub fn new() -> Self {
        let mut registry = Self {
            decoders: HashMap::new(),
        };

        // Register simple PDUs
        registry.register_pdu::<crate::datatypes::EnquireLink, _>(Frame::EnquireLink);
        registry.register_pdu::<crate::datatypes::EnquireLinkResponse, _>(Frame::EnquireLinkResp);
        registry.register_pdu::<crate::datatypes::Unbind, _>(Frame::Unbind);
        registry.register_pdu::<crate::datatypes::UnbindResponse, _>(Frame::UnbindResp);
        registry.register_pdu::<crate::datatypes::GenericNack, _>(Frame::GenericNack);
        registry.register_pdu::<crate::datatypes::Outbind, _>(Frame::Outbind);

        // Register bind PDUs
        registry.register_pdu::<crate::datatypes::BindTransmitter, _>(Frame::BindTransmitter);
        registry
            .register_pdu::<crate::datatypes::BindTransmitterResponse, _>(Frame::BindTransmitterResp);
        registry.register_pdu::<crate::datatypes::BindReceiver, _>(Frame::BindReceiver);
        registry.register_pdu::<crate::datatypes::BindReceiverResponse, _>(Frame::BindReceiverResp);
        registry.register_pdu::<crate::datatypes::BindTransceiver, _>(Frame::BindTransceiver);
        registry
            .register_pdu::<crate::datatypes::BindTransceiverResponse, _>(Frame::BindTransceiverResp);

        // Register message PDUs (boxed for large structs)
        registry.register_boxed_pdu::<crate::datatypes::SubmitSm, _>(|pdu| {
            Frame::SubmitSm(Box::new(pdu))
        });
        registry.register_pdu::<crate::datatypes::SubmitSmResponse, _>(Frame::SubmitSmResp);

        // Register submit_multi PDUs
        registry.register_boxed_pdu::<crate::datatypes::SubmitMulti, _>(|pdu| {
            Frame::SubmitMulti(Box::new(pdu))
        });
        registry.register_pdu::<crate::datatypes::SubmitMultiResponse, _>(Frame::SubmitMultiResp);

        // Register query PDUs
        registry.register_pdu::<crate::datatypes::QuerySm, _>(Frame::QuerySm);
        registry.register_pdu::<crate::datatypes::QuerySmResponse, _>(Frame::QuerySmResp);

        // Register replace PDUs
        registry.register_boxed_pdu::<crate::datatypes::ReplaceSm, _>(|pdu| {
            Frame::ReplaceSm(Box::new(pdu))
        });
        registry.register_pdu::<crate::datatypes::ReplaceSmResponse, _>(Frame::ReplaceSmResp);

        // Register cancel PDUs
        registry.register_pdu::<crate::datatypes::CancelSm, _>(Frame::CancelSm);
        registry.register_pdu::<crate::datatypes::CancelSmResponse, _>(Frame::CancelSmResp);

        // Register data_sm PDUs
        registry.register_boxed_pdu::<crate::datatypes::DataSm, _>(|pdu| {
            Frame::DataSm(Box::new(pdu))
        });
        registry.register_pdu::<crate::datatypes::DataSmResponse, _>(Frame::DataSmResp);

        // Register deliver_sm PDUs (boxed for large structs)
        registry.register_boxed_pdu::<crate::datatypes::DeliverSm, _>(|pdu| {
            Frame::DeliverSm(Box::new(pdu))
        });
        registry.register_pdu::<crate::datatypes::DeliverSmResponse, _>(Frame::DeliverSmResp);

        // Register notification PDUs
        registry.register_pdu::<crate::datatypes::AlertNotification, _>(Frame::AlertNotification);

        registry
    }

    /// Register a simple PDU type (no boxing required)
    fn register_pdu<T, F>(&mut self, frame_constructor: F)
    where
        T: Decodable + 'static,
        F: Fn(T) -> Frame + Send + Sync + 'static,
    {
        let command_id = T::command_id();
        let decoder = Box::new(move |header: PduHeader, buf: &mut Cursor<&[u8]>| {
            let pdu = T::decode(header, buf)?;
            Ok(frame_constructor(pdu))
        });
        self.decoders.insert(command_id, decoder);
    }

    /// Register a PDU type that should be boxed
    fn register_boxed_pdu<T, F>(&mut self, frame_constructor: F)
    where
        T: Decodable + 'static,
        F: Fn(T) -> Frame + Send + Sync + 'static,
    {
        let command_id = T::command_id();
        let decoder = Box::new(move |header: PduHeader, buf: &mut Cursor<&[u8]>| {
            let pdu = T::decode(header, buf)?;
            Ok(frame_constructor(pdu))
        });
        self.decoders.insert(command_id, decoder);
    }

    /// Decode a PDU given its header and body
    pub fn decode_pdu(
        &self,
        header: PduHeader,
        buf: &mut Cursor<&[u8]>,
    ) -> Result<Frame, CodecError> {
        match self.decoders.get(&header.command_id) {
            Some(decoder) => decoder(header, buf),
            None => {
                // Handle unknown PDU gracefully for forward compatibility
                let body_size = header.command_length as usize - PduHeader::SIZE;
                if buf.remaining() < body_size {
                    return Err(CodecError::Incomplete);
                }

                let body = buf.copy_to_bytes(body_size);
                tracing::warn!(
                    "Unknown PDU command_id: {:#x}, treating as opaque data",
                    header.command_id as u32
                );

                Ok(Frame::Unknown { header, body })
            }
        }
    }

    /// Check if a command_id is registered
    pub fn is_registered(&self, command_id: CommandId) -> bool {
        self.decoders.contains_key(&command_id)
    }

    /// Get all registered command_ids
    pub fn registered_commands(&self) -> Vec<CommandId> {
        self.decoders.keys().copied().collect()
    }
}

impl Default for PduRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Frame {
    /// Get the command_id for this frame
    pub fn command_id(&self) -> CommandId {
        match self {
            Frame::EnquireLink(_) => CommandId::EnquireLink,
            Frame::EnquireLinkResp(_) => CommandId::EnquireLinkResp,
            Frame::Unbind(_) => CommandId::Unbind,
            Frame::UnbindResp(_) => CommandId::UnbindResp,
            Frame::BindReceiver(_) => CommandId::BindReceiver,
            Frame::BindReceiverResp(_) => CommandId::BindReceiverResp,
            Frame::BindTransceiver(_) => CommandId::BindTransceiver,
            Frame::BindTransceiverResp(_) => CommandId::BindTransceiverResp,
            Frame::BindTransmitter(_) => CommandId::BindTransmitter,
            Frame::BindTransmitterResp(_) => CommandId::BindTransmitterResp,
            Frame::SubmitSm(_) => CommandId::SubmitSm,
            Frame::SubmitSmResp(_) => CommandId::SubmitSmResp,
            Frame::SubmitMulti(_) => CommandId::SubmitMulti,
            Frame::SubmitMultiResp(_) => CommandId::SubmitMultiResp,
            Frame::QuerySm(_) => CommandId::QuerySm,
            Frame::QuerySmResp(_) => CommandId::QuerySmResp,
            Frame::ReplaceSm(_) => CommandId::ReplaceSm,
            Frame::ReplaceSmResp(_) => CommandId::ReplaceSmResp,
            Frame::CancelSm(_) => CommandId::CancelSm,
            Frame::CancelSmResp(_) => CommandId::CancelSmResp,
            Frame::DataSm(_) => CommandId::DataSm,
            Frame::DataSmResp(_) => CommandId::DataSmResp,
            Frame::DeliverSm(_) => CommandId::DeliverSm,
            Frame::DeliverSmResp(_) => CommandId::DeliverSmResp,
            Frame::AlertNotification(_) => CommandId::AlertNotification,
            Frame::GenericNack(_) => CommandId::GenericNack,
            Frame::Outbind(_) => CommandId::Outbind,
            Frame::Unknown { header, .. } => header.command_id,
        }
    }

    /// Get the sequence number for this frame
    pub fn sequence_number(&self) -> u32 {
        match self {
            Frame::EnquireLink(pdu) => pdu.sequence_number,
            Frame::EnquireLinkResp(pdu) => pdu.sequence_number,
            Frame::Unbind(pdu) => pdu.sequence_number,
            Frame::UnbindResp(pdu) => pdu.sequence_number,
            Frame::BindReceiver(pdu) => pdu.sequence_number,
            Frame::BindReceiverResp(pdu) => pdu.sequence_number,
            Frame::BindTransceiver(pdu) => pdu.sequence_number,
            Frame::BindTransceiverResp(pdu) => pdu.sequence_number,
            Frame::BindTransmitter(pdu) => pdu.sequence_number,
            Frame::BindTransmitterResp(pdu) => pdu.sequence_number,
            Frame::SubmitSm(pdu) => pdu.sequence_number,
            Frame::SubmitSmResp(pdu) => pdu.sequence_number,
            Frame::SubmitMulti(pdu) => pdu.sequence_number,
            Frame::SubmitMultiResp(pdu) => pdu.sequence_number,
            Frame::QuerySm(pdu) => pdu.sequence_number,
            Frame::QuerySmResp(pdu) => pdu.sequence_number,
            Frame::ReplaceSm(pdu) => pdu.sequence_number,
            Frame::ReplaceSmResp(pdu) => pdu.sequence_number,
            Frame::CancelSm(pdu) => pdu.sequence_number,
            Frame::CancelSmResp(pdu) => pdu.sequence_number,
            Frame::DataSm(pdu) => pdu.sequence_number,
            Frame::DataSmResp(pdu) => pdu.sequence_number,
            Frame::DeliverSm(pdu) => pdu.sequence_number,
            Frame::DeliverSmResp(pdu) => pdu.sequence_number,
            Frame::AlertNotification(pdu) => pdu.sequence_number,
            Frame::GenericNack(pdu) => pdu.sequence_number,
            Frame::Outbind(pdu) => pdu.sequence_number,
            Frame::Unknown { header, .. } => header.sequence_number,
        }
    }

    /// Check if this frame is a response PDU
    pub fn is_response(&self) -> bool {
        self.command_id().is_response()
    }

    /// Legacy check method for backward compatibility
    pub fn check(buf: &mut Cursor<&[u8]>) -> Result<(), crate::frame::Error> {
        // Check if we have enough bytes for a header
        if buf.remaining() < PduHeader::SIZE {
            return Err(crate::frame::Error::Incomplete);
        }

        // Peek at command_length without advancing cursor
        let pos = buf.position();
        let command_length = buf.get_u32();
        buf.set_position(pos);

        // Validate length
        if command_length < PduHeader::SIZE as u32 {
            return Err(crate::frame::Error::Other(Box::new(
                CodecError::InvalidPduLength {
                    length: command_length,
                    min: PduHeader::SIZE as u32,
                    max: MAX_PDU_SIZE,
                },
            )));
        }

        // Check if we have the complete PDU
        if buf.remaining() < command_length as usize {
            return Err(crate::frame::Error::Incomplete);
        }

        Ok(())
    }

    /// Legacy parse method for backward compatibility
    pub fn parse(buf: &mut Cursor<&[u8]>) -> Result<Frame, crate::frame::Error> {
        let registry = PduRegistry::new();

        // Decode header
        let header = PduHeader::decode(buf)?;

        // Decode PDU using registry
        let frame = registry.decode_pdu(header, buf)?;

        Ok(frame)
    }
}
