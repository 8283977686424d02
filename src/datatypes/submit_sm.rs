use crate::codec::{
    CodecError, Decodable, Encodable, PduHeader, decode_cstring, decode_u8, encode_cstring,
    encode_u8,
};
use crate::datatypes::numeric_plan_indicator::NumericPlanIndicator;
use crate::datatypes::tags;
use crate::datatypes::tlv::Tlv;
use crate::datatypes::{
    CommandId, CommandStatus, DataCoding, DestinationAddr, EsmClass, MessageId,
    ScheduleDeliveryTime, ServiceType, ShortMessage, SourceAddr, TypeOfNumber, ValidityPeriod,
};
use bytes::{Buf, BytesMut};
use std::io::Cursor;

/// This operation is used by an ESME to submit a short message to the SMSC for onward transmission
/// to a specified short message entity (SME). The submit_sm PDU does not support the transaction
/// message mode.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmitSm {
    // pub command_length: u32,
    // pub command_id: CommandId::SubmitSm,
    pub command_status: CommandStatus,
    pub sequence_number: u32,

    // Mandatory parameters
    pub service_type: ServiceType,
    pub source_addr_ton: TypeOfNumber,
    pub source_addr_npi: NumericPlanIndicator,
    pub source_addr: SourceAddr,
    pub dest_addr_ton: TypeOfNumber,
    pub dest_addr_npi: NumericPlanIndicator,
    pub destination_addr: DestinationAddr,
    pub esm_class: EsmClass,
    pub protocol_id: u8,
    pub priority_flag: u8,
    pub schedule_delivery_time: ScheduleDeliveryTime,
    pub validity_period: ValidityPeriod,
    pub registered_delivery: u8,
    pub replace_if_present_flag: u8,
    pub data_coding: DataCoding,
    pub sm_default_msg_id: u8,
    pub sm_length: u8,
    pub short_message: ShortMessage,

    // Optional parameters
    pub user_message_reference: Option<Tlv>,
    pub source_port: Option<Tlv>,
    pub source_addr_submit: Option<Tlv>,
    pub destination_port: Option<Tlv>,
    pub dest_addr_submit: Option<Tlv>,
    pub sar_msg_ref_num: Option<Tlv>,
    pub sar_total_segments: Option<Tlv>,
    pub sar_segment_seqnum: Option<Tlv>,
    pub more_messages_to_send: Option<Tlv>,
    pub payload_type: Option<Tlv>,
    pub message_payload: Option<Tlv>,
    pub privacy_indicator: Option<Tlv>,
    pub callback_num: Option<Tlv>,
    pub callback_num_pres_ind: Option<Tlv>,
    pub callback_num_atag: Option<Tlv>,
    pub source_subaddress: Option<Tlv>,
    pub dest_subaddress: Option<Tlv>,
    pub display_time: Option<Tlv>,
    pub sms_signal: Option<Tlv>,
    pub ms_validity: Option<Tlv>,
    pub ms_msg_wait_facilities: Option<Tlv>,
    pub number_of_messages: Option<Tlv>,
    pub alert_on_msg_delivery: Option<Tlv>,
    pub language_indicator: Option<Tlv>,
    pub its_reply_type: Option<Tlv>,
    pub its_session_info: Option<Tlv>,
    pub ussd_service_op: Option<Tlv>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SubmitSmResponse {
    // pub command_length: u32,
    // pub command_id: CommandId::SubmitSmResp,
    pub command_status: CommandStatus,
    pub sequence_number: u32,

    // Body
    pub message_id: MessageId,
}

impl Encodable for SubmitSm {
    fn encode(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        let header = PduHeader {
            command_length: 0,
            command_id: CommandId::SubmitSm,
            command_status: self.command_status,
            sequence_number: self.sequence_number,
        };
        header.encode(buf)?;

        encode_cstring(buf, self.service_type.as_str(), 6);
        encode_u8(buf, self.source_addr_ton as u8);
        encode_u8(buf, self.source_addr_npi as u8);
        encode_cstring(buf, self.source_addr.as_str().unwrap_or(""), 21);
        encode_u8(buf, self.dest_addr_ton as u8);
        encode_u8(buf, self.dest_addr_npi as u8);
        encode_cstring(buf, self.destination_addr.as_str().unwrap_or(""), 21);
        encode_u8(buf, self.esm_class.to_byte());
        encode_u8(buf, self.protocol_id);
        encode_u8(buf, self.priority_flag);
        encode_cstring(buf, self.schedule_delivery_time.as_str().unwrap_or(""), 17);
        encode_cstring(buf, self.validity_period.as_str().unwrap_or(""), 17);
        encode_u8(buf, self.registered_delivery);
        encode_u8(buf, self.replace_if_present_flag);
        encode_u8(buf, self.data_coding.to_byte());
        encode_u8(buf, self.sm_default_msg_id);
        encode_u8(buf, self.sm_length);

        let message_bytes = self.short_message.as_bytes();
        buf.extend_from_slice(
            &message_bytes[..(self.sm_length as usize).min(message_bytes.len())],
        );

        for tlv in [
            &self.user_message_reference,
            &self.source_port,
            &self.source_addr_submit,
            &self.destination_port,
            &self.dest_addr_submit,
            &self.sar_msg_ref_num,
            &self.sar_total_segments,
            &self.sar_segment_seqnum,
            &self.more_messages_to_send,
            &self.payload_type,
            &self.message_payload,
            &self.privacy_indicator,
            &self.callback_num,
            &self.callback_num_pres_ind,
            &self.callback_num_atag,
            &self.source_subaddress,
            &self.dest_subaddress,
            &self.display_time,
            &self.sms_signal,
            &self.ms_validity,
            &self.ms_msg_wait_facilities,
            &self.number_of_messages,
            &self.alert_on_msg_delivery,
            &self.language_indicator,
            &self.its_reply_type,
            &self.its_session_info,
            &self.ussd_service_op,
        ] {
            if let Some(tlv) = tlv {
                tlv.encode(buf)?;
            }
        }

        Ok(())
    }
}

impl Decodable for SubmitSm {
    fn command_id() -> CommandId {
        CommandId::SubmitSm
    }

    fn decode(header: PduHeader, buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Self::validate_header(&header)?;

        let service_type = ServiceType::from_parsed_string(decode_cstring(buf, 6, "service_type")?)
            .map_err(|e| CodecError::FieldValidation {
                field: "service_type",
                reason: e.to_string(),
            })?;
        let source_addr_ton = TypeOfNumber::try_from(decode_u8(buf)?).map_err(|_| {
            CodecError::FieldValidation {
                field: "source_addr_ton",
                reason: "invalid type of number".into(),
            }
        })?;
        let source_addr_npi = NumericPlanIndicator::try_from(decode_u8(buf)?).map_err(|_| {
            CodecError::FieldValidation {
                field: "source_addr_npi",
                reason: "invalid numeric plan indicator".into(),
            }
        })?;
        let source_addr = SourceAddr::from_parsed_string(decode_cstring(buf, 21, "source_addr")?)
            .map_err(|e| CodecError::FieldValidation {
                field: "source_addr",
                reason: e.to_string(),
            })?;
        let dest_addr_ton = TypeOfNumber::try_from(decode_u8(buf)?).map_err(|_| {
            CodecError::FieldValidation {
                field: "dest_addr_ton",
                reason: "invalid type of number".into(),
            }
        })?;
        let dest_addr_npi = NumericPlanIndicator::try_from(decode_u8(buf)?).map_err(|_| {
            CodecError::FieldValidation {
                field: "dest_addr_npi",
                reason: "invalid numeric plan indicator".into(),
            }
        })?;
        let destination_addr =
            DestinationAddr::from_parsed_string(decode_cstring(buf, 21, "destination_addr")?)
                .map_err(|e| CodecError::FieldValidation {
                    field: "destination_addr",
                    reason: e.to_string(),
                })?;
        let esm_class = EsmClass::from_byte(decode_u8(buf)?).map_err(|e| {
            CodecError::FieldValidation {
                field: "esm_class",
                reason: e.to_string(),
            }
        })?;
        let protocol_id = decode_u8(buf)?;
        let priority_flag = decode_u8(buf)?;
        let schedule_delivery_time = ScheduleDeliveryTime::from_parsed_string(decode_cstring(
            buf,
            17,
            "schedule_delivery_time",
        )?)
        .map_err(|e| CodecError::FieldValidation {
            field: "schedule_delivery_time",
            reason: e.to_string(),
        })?;
        let validity_period =
            ValidityPeriod::from_parsed_string(decode_cstring(buf, 17, "validity_period")?)
                .map_err(|e| CodecError::FieldValidation {
                    field: "validity_period",
                    reason: e.to_string(),
                })?;
        let registered_delivery = decode_u8(buf)?;
        let replace_if_present_flag = decode_u8(buf)?;
        let data_coding = DataCoding::from_byte(decode_u8(buf)?);
        let sm_default_msg_id = decode_u8(buf)?;
        let sm_length = decode_u8(buf)?;

        if sm_length > 254 {
            return Err(CodecError::FieldValidation {
                field: "sm_length",
                reason: format!("sm_length ({sm_length}) exceeds maximum of 254 bytes"),
            });
        }

        if buf.remaining() < sm_length as usize {
            return Err(CodecError::Incomplete);
        }
        let message_bytes = buf.copy_to_bytes(sm_length as usize);
        let short_message =
            ShortMessage::new(&message_bytes).map_err(|e| CodecError::FieldValidation {
                field: "short_message",
                reason: e.to_string(),
            })?;

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

        while buf.has_remaining() {
            let tlv = Tlv::decode(buf)?;
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
                tags::MESSAGE_PAYLOAD => message_payload = Some(tlv),
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
                other => tracing::warn!("Unknown TLV tag in submit_sm: 0x{:04X}", other),
            }
        }

        Ok(SubmitSm {
            command_status: header.command_status,
            sequence_number: header.sequence_number,
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
        })
    }
}

impl Encodable for SubmitSmResponse {
    fn encode(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        let header = PduHeader {
            command_length: 0,
            command_id: CommandId::SubmitSmResp,
            command_status: self.command_status,
            sequence_number: self.sequence_number,
        };
        header.encode(buf)?;
        encode_cstring(buf, self.message_id.as_str().unwrap_or(""), 65);
        Ok(())
    }
}

impl Decodable for SubmitSmResponse {
    fn command_id() -> CommandId {
        CommandId::SubmitSmResp
    }

    fn decode(header: PduHeader, buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Self::validate_header(&header)?;
        let message_id = MessageId::from_parsed_string(decode_cstring(buf, 65, "message_id")?)
            .map_err(|e| CodecError::FieldValidation {
                field: "message_id",
                reason: e.to_string(),
            })?;

        Ok(SubmitSmResponse {
            command_status: header.command_status,
            sequence_number: header.sequence_number,
            message_id,
        })
    }
}
