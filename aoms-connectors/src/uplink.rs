//! LoRa network-server uplink events
//!
//! The network server publishes one JSON document per received uplink:
//!
//! ```json
//! {
//!   "applicationID": "3",
//!   "deviceName": "enclosure-07",
//!   "devEUI": "70b3d57ed0001234",
//!   "fCnt": 118,
//!   "fPort": 2,
//!   "data": "AQIDBA==",
//!   "rxInfo": [{ "gatewayID": "b827ebfffe000001", "rssi": -87, "loRaSNR": 9.2 }]
//! }
//! ```
//!
//! Only `devEUI` and `fCnt` are required. `data` is the application payload
//! in standard base64.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::signal::signal_strength_percentage;

/// Device EUIs are 64-bit, written as 16 hex digits
pub const EUI_HEX_LEN: usize = 16;

/// Uplink decoding errors
#[derive(Debug, Error)]
pub enum UplinkError {
    #[error("Malformed event: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed payload: {0}")]
    Payload(#[from] base64::DecodeError),

    #[error("Invalid device EUI: {0}")]
    InvalidEui(String),
}

/// Radio metadata from one receiving gateway
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RxInfo {
    #[serde(rename = "gatewayID", default)]
    pub gateway_id: Option<String>,
    #[serde(default)]
    pub rssi: Option<i32>,
    #[serde(rename = "loRaSNR", default)]
    pub lora_snr: Option<f64>,
}

impl RxInfo {
    /// Link quality score for this gateway
    pub fn signal_strength(&self) -> f64 {
        signal_strength_percentage(self.rssi.map(f64::from), self.lora_snr)
    }
}

/// One uplink as published by the network server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UplinkEvent {
    #[serde(rename = "devEUI")]
    pub dev_eui: String,
    #[serde(rename = "applicationID", default)]
    pub application_id: Option<String>,
    #[serde(default)]
    pub device_name: Option<String>,
    pub f_cnt: u32,
    #[serde(default)]
    pub f_port: u8,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub rx_info: Vec<RxInfo>,
}

impl UplinkEvent {
    /// Parse and validate an event
    ///
    /// The device EUI is normalised to lower case.
    pub fn from_json(raw: &[u8]) -> Result<Self, UplinkError> {
        let mut event: Self = serde_json::from_slice(raw)?;

        if !is_valid_eui(&event.dev_eui) {
            return Err(UplinkError::InvalidEui(event.dev_eui));
        }
        event.dev_eui.make_ascii_lowercase();

        Ok(event)
    }

    /// Decoded application payload, empty when the event carries none
    pub fn payload(&self) -> Result<Vec<u8>, UplinkError> {
        match self.data.as_deref() {
            Some(data) if !data.is_empty() => Ok(STANDARD.decode(data)?),
            _ => Ok(Vec::new()),
        }
    }

    /// Gateway with the best link score
    pub fn best_gateway(&self) -> Option<&RxInfo> {
        self.rx_info
            .iter()
            .max_by(|a, b| a.signal_strength().total_cmp(&b.signal_strength()))
    }

    /// Best link score across gateways, 0 when none reported
    pub fn signal_strength(&self) -> f64 {
        self.best_gateway().map_or(0.0, RxInfo::signal_strength)
    }
}

/// Whether `eui` is exactly 16 hex digits
pub fn is_valid_eui(eui: &str) -> bool {
    eui.len() == EUI_HEX_LEN && eui.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVENT: &str = r#"{
        "applicationID": "3",
        "deviceName": "enclosure-07",
        "devEUI": "70B3D57ED0001234",
        "fCnt": 118,
        "fPort": 2,
        "data": "AQIDBA==",
        "rxInfo": [
            { "gatewayID": "b827ebfffe000001", "rssi": -110, "loRaSNR": -2.0 },
            { "gatewayID": "b827ebfffe000002", "rssi": -80, "loRaSNR": 9.0 }
        ]
    }"#;

    #[test]
    fn parses_network_server_event() {
        let event = UplinkEvent::from_json(EVENT.as_bytes()).unwrap();

        assert_eq!(event.dev_eui, "70b3d57ed0001234");
        assert_eq!(event.f_cnt, 118);
        assert_eq!(event.f_port, 2);
        assert_eq!(event.device_name.as_deref(), Some("enclosure-07"));
        assert_eq!(event.payload().unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn best_gateway_wins() {
        let event = UplinkEvent::from_json(EVENT.as_bytes()).unwrap();
        let best = event.best_gateway().unwrap();

        assert_eq!(best.gateway_id.as_deref(), Some("b827ebfffe000002"));
        assert_eq!(event.signal_strength(), 80.0);
    }

    #[test]
    fn minimal_event() {
        let event = UplinkEvent::from_json(br#"{"devEUI":"0000000000000001","fCnt":0}"#).unwrap();
        assert!(event.payload().unwrap().is_empty());
        assert_eq!(event.signal_strength(), 0.0);
    }

    #[test]
    fn rejects_bad_eui() {
        let err = UplinkEvent::from_json(br#"{"devEUI":"70b3d57ed00012","fCnt":1}"#).unwrap_err();
        assert!(matches!(err, UplinkError::InvalidEui(_)));

        assert!(!is_valid_eui("70b3d57ed000123g"));
        assert!(is_valid_eui("70b3d57ed000123f"));
    }

    #[test]
    fn rejects_bad_payload() {
        let event = UplinkEvent::from_json(br#"{"devEUI":"0000000000000001","fCnt":0,"data":"@@"}"#).unwrap();
        assert!(matches!(event.payload(), Err(UplinkError::Payload(_))));
    }

    #[test]
    fn rejects_missing_fcnt() {
        let err = UplinkEvent::from_json(br#"{"devEUI":"0000000000000001"}"#).unwrap_err();
        assert!(matches!(err, UplinkError::Json(_)));
    }
}
