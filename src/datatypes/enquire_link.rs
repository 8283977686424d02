use crate::codec::{CodecError, Decodable, Encodable, PduHeader};
use crate::datatypes::{CommandId, CommandStatus};
use bytes::{Buf, BytesMut};
use std::io::Cursor;

/// The purpose of the SMPP enquire_link operation is to provide a
/// confidence-check of the communication path between an ESME and an SMSC.
#[derive(Clone, Debug, PartialEq)]
pub struct EnquireLink {
    // pub command_length: u32,
    // pub command_id: CommandId::EnquireLink,
    pub command_status: CommandStatus,
    pub sequence_number: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnquireLinkResponse {
    // pub command_length: u32,
    // pub command_id: CommandId::EnquireLinkResp,
    pub command_status: CommandStatus,
    pub sequence_number: u32,
}

impl Decodable for EnquireLink {
    fn command_id() -> CommandId {
        CommandId::EnquireLink
    }

    fn decode(header: PduHeader, buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Self::validate_header(&header)?;

        if buf.has_remaining() {
            return Err(CodecError::FieldValidation {
                field: "enquire_link_body",
                reason: "enquire_link PDU should have no body".to_string(),
            });
        }

        Ok(EnquireLink {
            command_status: header.command_status,
            sequence_number: header.sequence_number,
        })
    }
}

impl Encodable for EnquireLink {
    fn encode(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        let header = PduHeader {
            command_length: PduHeader::SIZE as u32,
            command_id: CommandId::EnquireLink,
            command_status: self.command_status,
            sequence_number: self.sequence_number,
        };
        header.encode(buf)?;
        Ok(())
    }

    fn encoded_size(&self) -> usize {
        PduHeader::SIZE
    }
}

impl Decodable for EnquireLinkResponse {
    fn command_id() -> CommandId {
        CommandId::EnquireLinkResp
    }

    fn decode(header: PduHeader, buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Self::validate_header(&header)?;

        if buf.has_remaining() {
            return Err(CodecError::FieldValidation {
                field: "enquire_link_resp_body",
                reason: "enquire_link_resp PDU should have no body".to_string(),
            });
        }

        Ok(EnquireLinkResponse {
            command_status: header.command_status,
            sequence_number: header.sequence_number,
        })
    }
}

impl Encodable for EnquireLinkResponse {
    fn encode(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        let header = PduHeader {
            command_length: PduHeader::SIZE as u32,
            command_id: CommandId::EnquireLinkResp,
            command_status: self.command_status,
            sequence_number: self.sequence_number,
        };
        header.encode(buf)?;
        Ok(())
    }

    fn encoded_size(&self) -> usize {
        PduHeader::SIZE
    }
}

impl EnquireLink {
    pub fn new(sequence_number: u32) -> Self {
        Self {
            command_status: CommandStatus::Ok,
            sequence_number,
        }
    }
}

impl EnquireLinkResponse {
    pub fn new(sequence_number: u32) -> Self {
        Self {
            command_status: CommandStatus::Ok,
            sequence_number,
        }
    }

    pub fn error(sequence_number: u32, status: CommandStatus) -> Self {
        Self {
            command_status: status,
            sequence_number,
        }
    }
}
