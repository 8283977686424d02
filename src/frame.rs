//! Provides a type representing an SMPP protocol frame as well as utilities for
//! parsing frames from a byte array.

use crate::datatypes::tags;
use crate::datatypes::{
    BindReceiver, BindReceiverResponse, BindTransmitter, BindTransmitterResponse, CommandId,
    CommandStatus, EnquireLink, EnquireLinkResponse, InterfaceVersion, NumericPlanIndicator,
    PriorityFlag, SubmitSm, SubmitSmResponse, Tlv, TypeOfNumber, Unbind, UnbindResponse,
};
use bytes::Buf;
use core::fmt;
use num_enum::TryFromPrimitiveError;
use std::convert::TryFrom;
use std::io::Cursor;
use std::mem::size_of;
use std::num::TryFromIntError;
use std::string::FromUtf8Error;

#[derive(Clone, Debug)]
pub enum Frame {
    BindReceiver(BindReceiver),
    BindReceiverResponse(BindReceiverResponse),
    BindTransmitter(BindTransmitter),
    BindTransmitterResponse(BindTransmitterResponse),
    EnquireLink(EnquireLink),
    EnquireLinkResponse(EnquireLinkResponse),
    SubmitSm(Box<SubmitSm>),
    SubmitSmResponse(SubmitSmResponse),
    Unbind(Unbind),
    UnbindResponse(UnbindResponse),
}

#[derive(Debug)]
pub enum Error {
    /// Not enough data is available to parse a message
    Incomplete,

    /// Invalid message encoding
    Other(crate::Error),
}

impl Frame {
    /// Checks if an entire message can be decoded from `src`. If it can be, return the
    /// command_length that can be used to allocate the buffer for parsing.
    #[tracing::instrument]
    pub fn check(src: &mut Cursor<&[u8]>) -> Result<usize, Error> {
        // The length of the PDU including the command_length.
        let command_length = peek_u32(src)? as usize;

        // PDUs have a the same header structure consisting of the following
        // fields:
        //  - command_length (4 octets)
        //  - command_type (4 octets)
        //  - command_status (4 octets)
        //  - sequence_number (4 octets)
        // for a total of 16 octets
        (command_length <= src.remaining() && command_length > 16)
            .then_some(command_length)
            .ok_or(Error::Incomplete)
    }

    /// The message has already been validated with `check`.
    #[tracing::instrument]
    pub fn parse(src: &mut Cursor<&[u8]>) -> Result<Frame, Error> {
        // parse the header
        let _command_length = get_u32(src)?;
        let command_id = CommandId::try_from(get_u32(src)?)?;
        let command_status = CommandStatus::try_from(get_u32(src)?)?;
        let sequence_number = get_u32(src)?;

        // Based on the command_id, parse the body
        let command = match command_id {
            CommandId::BindTransmitter => {
                let system_id = get_cstring_field(src, 16, "system_id")?;
                let password = get_cstring_field(src, 9, "password")?;
                let system_type = get_cstring_field(src, 13, "system_type")?;
                let interface_version = InterfaceVersion::try_from(get_u8(src)?)?;
                let addr_ton = TypeOfNumber::try_from(get_u8(src)?)?;
                let addr_npi = NumericPlanIndicator::try_from(get_u8(src)?)?;
                let address_range = get_cstring_field(src, 41, "address_range")?;

                let pdu = BindTransmitter {
                    command_status,
                    sequence_number,
                    system_id,
                    password: if password.is_empty() {
                        None
                    } else {
                        Some(password)
                    },
                    system_type,
                    interface_version,
                    addr_ton,
                    addr_npi,
                    address_range,
                };
                Frame::BindTransmitter(pdu)
            }
            CommandId::BindTransmitterResp => {
                let system_id = get_cstring_field(src, 16, "system_id")?;

                let sc_interface_version = match src.has_remaining() {
                    true => Some(get_tlv(src)?),
                    false => None,
                };

                let pdu = BindTransmitterResponse {
                    command_status,
                    sequence_number,
                    system_id,
                    sc_interface_version,
                };

                Frame::BindTransmitterResponse(pdu)
            }
            CommandId::BindReceiver => {
                let system_id = get_cstring_field(src, 16, "system_id")?;
                let password = get_cstring_field(src, 9, "password")?;
                let system_type = get_cstring_field(src, 13, "system_type")?;
                let interface_version = InterfaceVersion::try_from(get_u8(src)?)?;
                let addr_ton = TypeOfNumber::try_from(get_u8(src)?)?;
                let addr_npi = NumericPlanIndicator::try_from(get_u8(src)?)?;
                let address_range = get_cstring_field(src, 41, "address_range")?;

                let pdu = BindReceiver {
                    command_status,
                    sequence_number,
                    system_id,
                    password: if password.is_empty() {
                        None
                    } else {
                        Some(password)
                    },
                    system_type,
                    interface_version,
                    addr_ton,
                    addr_npi,
                    address_range,
                };
                Frame::BindReceiver(pdu)
            }
            CommandId::BindReceiverResp => {
                let system_id = get_cstring_field(src, 16, "system_id")?;

                let sc_interface_version = match src.has_remaining() {
                    true => Some(get_tlv(src)?),
                    false => None,
                };

                let pdu = BindReceiverResponse {
                    command_status,
                    sequence_number,
                    system_id,
                    sc_interface_version,
                };

                Frame::BindReceiverResponse(pdu)
            }
            CommandId::EnquireLink => {
                let pdu = EnquireLink { sequence_number };
                Frame::EnquireLink(pdu)
            }
            CommandId::EnquireLinkResp => {
                let pdu = EnquireLinkResponse { sequence_number };
                Frame::EnquireLinkResponse(pdu)
            }
            CommandId::SubmitSmResp => {
                let message_id = get_cstring_field(src, 65, "message_id")?;

                let pdu = SubmitSmResponse {
                    command_status,
                    sequence_number,
                    message_id,
                };

                Frame::SubmitSmResponse(pdu)
            }
            CommandId::SubmitSm => {
                // Parse mandatory fields
                let service_type = get_cstring_field(src, 6, "service_type")?;
                let source_addr_ton = TypeOfNumber::try_from(get_u8(src)?)?;
                let source_addr_npi = NumericPlanIndicator::try_from(get_u8(src)?)?;
                let source_addr = get_cstring_field(src, 21, "source_addr")?;
                let dest_addr_ton = TypeOfNumber::try_from(get_u8(src)?)?;
                let dest_addr_npi = NumericPlanIndicator::try_from(get_u8(src)?)?;
                let destination_addr = get_cstring_field(src, 21, "destination_addr")?;
                let esm_class = get_u8(src)?;
                let protocol_id = get_u8(src)?;
                let priority_flag = PriorityFlag::try_from(get_u8(src)?)?;
                let schedule_delivery_time = get_cstring_field(src, 17, "schedule_delivery_time")?;
                let validity_period = get_cstring_field(src, 17, "validity_period")?;
                let registered_delivery = get_u8(src)?;
                let replace_if_present_flag = get_u8(src)?;
                let data_coding = get_u8(src)?;
                let sm_default_msg_id = get_u8(src)?;
                let sm_length = get_u8(src)?;

                // Validate sm_length is within bounds
                if sm_length > 254 {
                    return Err(Error::Other(
                        format!("sm_length ({sm_length}) exceeds maximum of 254 bytes").into(),
                    ));
                }

                // Ensure we have enough remaining bytes for the short message
                if src.remaining() < sm_length as usize {
                    return Err(Error::Incomplete);
                }

                // Read short message based on sm_length
                let short_message = if sm_length > 0 {
                    let message_bytes = src.copy_to_bytes(sm_length as usize);
                    String::from_utf8(message_bytes.into()).map_err(|e| {
                        Error::Other(format!("Invalid UTF-8 in short_message: {e}").into())
                    })?
                } else {
                    String::new()
                };

                // Parse optional TLV parameters
                let mut user_message_reference = None;
                let mut source_port = None;
                let mut source_addr_submit = None;
                let mut destination_port = None;
                let mut dest_addr_submit = None;
                let mut sar_msg_ref_num = None;
                let mut sar_total_segments = None;
                let mut sar_segment_seqnum = None;
                let mut more_messages_to_send = None;
                let mut payload_type = None;
                let mut message_payload = None;
                let mut privacy_indicator = None;
                let mut callback_num = None;
                let mut callback_num_pres_ind = None;
                let mut callback_num_atag = None;
                let mut source_subaddress = None;
                let mut dest_subaddress = None;
                let mut display_time = None;
                let mut sms_signal = None;
                let mut ms_validity = None;
                let mut ms_msg_wait_facilities = None;
                let mut number_of_messages = None;
                let mut alert_on_msg_delivery = None;
                let mut language_indicator = None;
                let mut its_reply_type = None;
                let mut its_session_info = None;
                let mut ussd_service_op = None;

                // Parse any remaining TLV parameters
                while src.has_remaining() {
                    let tlv = get_tlv(src)?;
                    match tlv.tag {
                        tags::USER_MESSAGE_REFERENCE => user_message_reference = Some(tlv),
                        tags::SOURCE_PORT => source_port = Some(tlv),
                        tags::SOURCE_ADDR_SUBMIT => source_addr_submit = Some(tlv),
                        tags::DESTINATION_PORT => destination_port = Some(tlv),
                        tags::DEST_ADDR_SUBMIT => dest_addr_submit = Some(tlv),
                        tags::SAR_MSG_REF_NUM => sar_msg_ref_num = Some(tlv),
                        tags::SAR_TOTAL_SEGMENTS => sar_total_segments = Some(tlv),
                        tags::SAR_SEGMENT_SEQNUM => sar_segment_seqnum = Some(tlv),
                        tags::MORE_MESSAGES_TO_SEND => more_messages_to_send = Some(tlv),
                        tags::PAYLOAD_TYPE => payload_type = Some(tlv),
                        tags::MESSAGE_PAYLOAD => {
                            // Validate mutual exclusivity with short_message
                            if !short_message.is_empty() {
                                return Err(Error::Other("Cannot use both short_message and message_payload - they are mutually exclusive".into()));
                            }
                            message_payload = Some(tlv);
                        }
                        tags::PRIVACY_INDICATOR => privacy_indicator = Some(tlv),
                        tags::CALLBACK_NUM => callback_num = Some(tlv),
                        tags::CALLBACK_NUM_PRES_IND => callback_num_pres_ind = Some(tlv),
                        tags::CALLBACK_NUM_ATAG => callback_num_atag = Some(tlv),
                        tags::SOURCE_SUBADDRESS => source_subaddress = Some(tlv),
                        tags::DEST_SUBADDRESS => dest_subaddress = Some(tlv),
                        tags::DISPLAY_TIME => display_time = Some(tlv),
                        tags::SMS_SIGNAL => sms_signal = Some(tlv),
                        tags::MS_VALIDITY => ms_validity = Some(tlv),
                        tags::MS_MSG_WAIT_FACILITIES => ms_msg_wait_facilities = Some(tlv),
                        tags::NUMBER_OF_MESSAGES => number_of_messages = Some(tlv),
                        tags::ALERT_ON_MSG_DELIVERY => alert_on_msg_delivery = Some(tlv),
                        tags::LANGUAGE_INDICATOR => language_indicator = Some(tlv),
                        tags::ITS_REPLY_TYPE => its_reply_type = Some(tlv),
                        tags::ITS_SESSION_INFO => its_session_info = Some(tlv),
                        tags::USSD_SERVICE_OP => ussd_service_op = Some(tlv),
                        _ => {
                            // Unknown TLV - log warning but continue
                            tracing::warn!("Unknown TLV tag: 0x{:04X}", tlv.tag);
                        }
                    }
                }

                let pdu = SubmitSm {
                    command_status,
                    sequence_number,
                    service_type,
                    source_addr_ton,
                    source_addr_npi,
                    source_addr,
                    dest_addr_ton,
                    dest_addr_npi,
                    destination_addr,
                    esm_class,
                    protocol_id,
                    priority_flag,
                    schedule_delivery_time,
                    validity_period,
                    registered_delivery,
                    replace_if_present_flag,
                    data_coding,
                    sm_default_msg_id,
                    sm_length,
                    short_message,
                    user_message_reference,
                    source_port,
                    source_addr_submit,
                    destination_port,
                    dest_addr_submit,
                    sar_msg_ref_num,
                    sar_total_segments,
                    sar_segment_seqnum,
                    more_messages_to_send,
                    payload_type,
                    message_payload,
                    privacy_indicator,
                    callback_num,
                    callback_num_pres_ind,
                    callback_num_atag,
                    source_subaddress,
                    dest_subaddress,
                    display_time,
                    sms_signal,
                    ms_validity,
                    ms_msg_wait_facilities,
                    number_of_messages,
                    alert_on_msg_delivery,
                    language_indicator,
                    its_reply_type,
                    its_session_info,
                    ussd_service_op,
                };

                Frame::SubmitSm(Box::new(pdu))
            }
            CommandId::Unbind => {
                let pdu = Unbind {
                    command_status,
                    sequence_number,
                };
                Frame::Unbind(pdu)
            }
            CommandId::UnbindResp => {
                let pdu = UnbindResponse {
                    command_status,
                    sequence_number,
                };
                Frame::UnbindResponse(pdu)
            }

            _ => {
                eprintln!(
                    "Unimplemented command ID: {command_id:?} (0x{:08x})",
                    command_id.clone() as u32
                );
                todo!("Implement the parse function for all the other PDUs")
            }
        };

        Ok(command)
    }

    // /// Converts the frame to an "unexpected frame" error
    // pub(crate) fn to_error(&self) -> crate::Error {
    //     format!("unexpected frame: {}", self).into()
    // }
}

/// Peek a u8 from the buffer
#[tracing::instrument]
fn peek_u8(src: &mut Cursor<&[u8]>) -> Result<u8, Error> {
    src.has_remaining()
        .then(|| {
            let starting_position = src.position();
            let val = src.get_u8();
            src.set_position(starting_position);
            val
        })
        .ok_or(Error::Incomplete)
}

/// Peek a u32 from the buffer
#[tracing::instrument]
fn peek_u32(src: &mut Cursor<&[u8]>) -> Result<u32, Error> {
    (src.remaining() >= size_of::<u32>())
        .then(|| {
            let starting_position = src.position();
            let val = src.get_u32();
            src.set_position(starting_position);
            val
        })
        .ok_or(Error::Incomplete)
}

/// Get a u8 from the buffer
#[tracing::instrument]
fn get_u8(src: &mut Cursor<&[u8]>) -> Result<u8, Error> {
    src.has_remaining()
        .then(|| src.get_u8())
        .ok_or(Error::Incomplete)
}

/// Get a u16 from the buffer
#[tracing::instrument]
fn get_u16(src: &mut Cursor<&[u8]>) -> Result<u16, Error> {
    (src.remaining() >= size_of::<u16>())
        .then(|| src.get_u16())
        .ok_or(Error::Incomplete)
}

/// Get a u32 from the buffer
#[tracing::instrument]
fn get_u32(src: &mut Cursor<&[u8]>) -> Result<u32, Error> {
    (src.remaining() >= size_of::<u32>())
        .then(|| src.get_u32())
        .ok_or(Error::Incomplete)
}

#[tracing::instrument]
fn get_cstring_field(
    src: &mut Cursor<&[u8]>,
    max_length: usize,
    field_name: &str,
) -> Result<String, Error> {
    if !src.has_remaining() {
        return Err(Error::Other(
            format!("No data available for field {field_name}").into(),
        ));
    }

    let _start_pos = src.position();
    let available_bytes = src.remaining().min(max_length);

    // Look for null terminator within field bounds
    let mut terminator_pos = None;
    let current_chunk = src.chunk();
    for i in 0..available_bytes {
        if i < current_chunk.len() && current_chunk[i] == 0 {
            terminator_pos = Some(i);
            break;
        }
    }

    let string_length = match terminator_pos {
        Some(pos) => pos,
        None => {
            // If no null terminator found within max_length, check if we hit the field boundary
            if available_bytes == max_length {
                // Field uses full width without null terminator - handle gracefully but log warning
                tracing::warn!(
                    "Field {} missing null terminator, using full field length",
                    field_name
                );
                max_length.saturating_sub(1) // Reserve space for implied null terminator
            } else {
                return Err(Error::Other(
                    format!(
                        "Missing null terminator in field {field_name} (available: {available_bytes}, max: {max_length})"
                    )
                    .into(),
                ));
            }
        }
    };

    // Extract string content only (without null terminator)
    let string_bytes = src.copy_to_bytes(string_length);

    // Skip null terminator if present
    if terminator_pos.is_some() && src.has_remaining() {
        src.advance(1);
    }

    // Validate UTF-8 and convert
    match String::from_utf8(string_bytes.into()) {
        Ok(s) => Ok(s),
        Err(e) => Err(Error::Other(
            format!("Invalid UTF-8 in field {field_name}: {e}").into(),
        )),
    }
}

// Keep the old function for backward compatibility during transition
#[tracing::instrument]
#[deprecated(note = "Use get_cstring_field instead for better error handling and SMPP compliance")]
fn get_until_coctet_string(
    src: &mut Cursor<&[u8]>,
    max_length: Option<u64>,
) -> Result<String, Error> {
    let max_len = max_length.unwrap_or(256) as usize;
    get_cstring_field(src, max_len, "unknown_field")
}

#[tracing::instrument]
fn get_tlv(src: &mut Cursor<&[u8]>) -> Result<Tlv, Error> {
    if !&src.has_remaining() {
        return Err(Error::Incomplete);
    }

    let tag = get_u16(src)?;
    let length = get_u16(src)?;
    let value = src.copy_to_bytes(length as usize);

    let tlv = Tlv { tag, length, value };

    Ok(tlv)
}

/// Advance the buffer by n bytes. If there are not enough bytes remaining,
/// return an error indicating that the data is incomplete.
#[tracing::instrument]
fn skip(src: &mut Cursor<&[u8]>, n: usize) -> Result<(), Error> {
    (src.remaining() >= n)
        .then(|| src.advance(n))
        .ok_or(Error::Incomplete)
}

impl fmt::Display for Frame {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        // TODO: we can probably do a lot better here...
        match self {
            Frame::BindTransmitter(msg) => {
                write!(fmt, "Bind Transmitter {:?}", msg.command_status)
            }
            Frame::BindTransmitterResponse(msg) => {
                write!(fmt, "Bind Transmitter Response {:?}", msg.command_status)
            }
            Frame::EnquireLink(msg) => {
                write!(fmt, "Enquire Link {:?}", msg.sequence_number)
            }
            Frame::EnquireLinkResponse(msg) => {
                write!(fmt, "Enquire Link Response {:?}", msg.sequence_number)
            }
            Frame::SubmitSm(msg) => {
                write!(fmt, "Submit SM {:?}", msg.command_status)
            }
            Frame::SubmitSmResponse(msg) => {
                write!(fmt, "Submit SM Response {:?}", msg.command_status)
            }
            Frame::Unbind(msg) => {
                write!(fmt, "Unbind {:?}", msg.command_status)
            }
            Frame::UnbindResponse(msg) => {
                write!(fmt, "Unbind Response {:?}", msg.command_status)
            }
            Frame::BindReceiver(msg) => {
                write!(fmt, "Bind Receiver {:?}", msg.command_status)
            }
            Frame::BindReceiverResponse(msg) => {
                write!(fmt, "Bind Receiver Response {:?}", msg.command_status)
            }
        }
    }
}

impl From<String> for Error {
    fn from(src: String) -> Error {
        Error::Other(src.into())
    }
}

impl From<&str> for Error {
    fn from(src: &str) -> Error {
        src.to_string().into()
    }
}

impl From<FromUtf8Error> for Error {
    fn from(_src: FromUtf8Error) -> Error {
        "protocol error; invalid frame format".into()
    }
}

impl From<TryFromIntError> for Error {
    fn from(_src: TryFromIntError) -> Error {
        "protocol error; invalid frame format".into()
    }
}

impl From<TryFromPrimitiveError<CommandId>> for Error {
    fn from(_src: TryFromPrimitiveError<CommandId>) -> Error {
        "protocol error; invalid command identifier in frame".into()
    }
}

impl From<TryFromPrimitiveError<CommandStatus>> for Error {
    fn from(_src: TryFromPrimitiveError<CommandStatus>) -> Error {
        "protocol error; invalid command status in frame".into()
    }
}

impl From<TryFromPrimitiveError<InterfaceVersion>> for Error {
    fn from(_src: TryFromPrimitiveError<InterfaceVersion>) -> Error {
        "protocol error; invalid interface version in frame".into()
    }
}

impl From<TryFromPrimitiveError<NumericPlanIndicator>> for Error {
    fn from(_src: TryFromPrimitiveError<NumericPlanIndicator>) -> Error {
        "protocol error; invalid numeric plan indicator in frame".into()
    }
}

impl From<TryFromPrimitiveError<TypeOfNumber>> for Error {
    fn from(_src: TryFromPrimitiveError<TypeOfNumber>) -> Error {
        "protocol error; invalid type of number in frame".into()
    }
}

impl From<TryFromPrimitiveError<PriorityFlag>> for Error {
    fn from(_src: TryFromPrimitiveError<PriorityFlag>) -> Error {
        "protocol error; invalid priority flag in frame".into()
    }
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Incomplete => "stream ended early".fmt(fmt),
            Error::Other(err) => err.fmt(fmt),
        }
    }
}
