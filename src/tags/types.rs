//! Tag-layer data types shared between the tags engine and the detector.

use heapless::Vec;

use crate::nci::frame::rf_protocol;

/// Longest NFCID this firmware carries (triple-size NFCID1).
pub const MAX_NFCID_LEN: usize = 10;

/// Outcome of a tag-layer operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Failed,
}

/// Which operation a completion reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpId {
    /// Controller reset and initialization.
    Reset,
    /// Discovery started (polling for tags).
    Discover,
    /// A tag was discovered and activated.
    DiscoverActivated,
    /// Tag deactivated, discovery re-armed.
    Deactivate,
    /// Memory dump of the active tag.
    Dump,
}

impl OpId {
    pub fn name(self) -> &'static str {
        match self {
            Self::Reset => "reset",
            Self::Discover => "discover",
            Self::DiscoverActivated => "discover_activated",
            Self::Deactivate => "deactivate",
            Self::Dump => "dump",
        }
    }
}

/// One completed tag-layer operation, delivered to the consumer callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub status: Status,
    pub op: OpId,
}

impl Completion {
    pub fn ok(op: OpId) -> Self {
        Self {
            status: Status::Ok,
            op,
        }
    }

    pub fn failed(op: OpId) -> Self {
        Self {
            status: Status::Failed,
            op,
        }
    }
}

/// Tag technology families this firmware recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagType {
    Type1,
    Type2,
    Type3,
}

impl TagType {
    /// Numeric code as reported over the console, matching the NCI
    /// protocol identifier.
    pub fn code(self) -> u8 {
        match self {
            Self::Type1 => 1,
            Self::Type2 => 2,
            Self::Type3 => 3,
        }
    }

    fn from_protocol(protocol: u8) -> Option<Self> {
        match protocol {
            rf_protocol::T1T => Some(Self::Type1),
            rf_protocol::T2T => Some(Self::Type2),
            rf_protocol::T3T => Some(Self::Type3),
            _ => None,
        }
    }
}

/// An activated tag interface: technology plus unique identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagIntf {
    tag_type: TagType,
    nfcid: Vec<u8, MAX_NFCID_LEN>,
}

impl TagIntf {
    pub fn tag_type(&self) -> TagType {
        self.tag_type
    }

    pub fn nfcid(&self) -> &[u8] {
        &self.nfcid
    }

    pub fn nfcid_len(&self) -> usize {
        self.nfcid.len()
    }

    /// Parse an `RF_INTF_ACTIVATED_NTF` payload.
    ///
    /// Layout: `[disc_id, rf_intf, rf_protocol, act_tech, max_payload,
    /// credits, tech_params_len, tech_params...]`. For NFC-A the params
    /// carry `[sens_res(2), nfcid1_len, nfcid1...]`; for NFC-F they carry
    /// `[bit_rate, sensf_len, sensf_res...]` where the first 8 bytes of
    /// SENSF_RES are the NFCID2.
    ///
    /// Returns `None` for protocols this firmware does not handle and for
    /// truncated payloads.
    pub fn from_activation(params: &[u8]) -> Option<Self> {
        let protocol = *params.get(2)?;
        let tag_type = TagType::from_protocol(protocol)?;
        let tech = *params.get(3)?;
        let tech_params = params.get(7..)?;

        let id = match tech {
            t if t == crate::nci::frame::rf_tech::NFC_A_PASSIVE_POLL => {
                let len = *tech_params.get(2)? as usize;
                tech_params.get(3..3 + len)?
            }
            t if t == crate::nci::frame::rf_tech::NFC_F_PASSIVE_POLL => {
                let sensf_len = *tech_params.get(1)? as usize;
                if sensf_len < 8 {
                    return None;
                }
                tech_params.get(2..10)?
            }
            _ => return None,
        };

        let mut nfcid = Vec::new();
        nfcid.extend_from_slice(id).ok()?;
        Some(Self { tag_type, nfcid })
    }
}
