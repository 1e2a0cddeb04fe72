use chrono::{DateTime, Utc};

use crate::grammar::parse_source_filter;
use crate::{Result, SdpError};

pub const NET_TYPE_IN: &str = "IN";
pub const ADDR_TYPE_IP4: &str = "IP4";
pub const ADDR_TYPE_IP6: &str = "IP6";

pub const MODE_INCL: &str = "incl";
pub const MODE_EXCL: &str = "excl";

pub const MEDIA_AUDIO: &str = "audio";
pub const MEDIA_VIDEO: &str = "video";
pub const MEDIA_TEXT: &str = "text";
pub const MEDIA_APPLICATION: &str = "application";
pub const MEDIA_MESSAGE: &str = "message";

/// Seconds between the NTP epoch (1900-01-01) and the Unix epoch.
pub const NTP_EPOCH_OFFSET: i64 = 2_208_988_800;

const SOURCE_FILTER: &str = "source-filter";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bandwidth {
    pub kind: String,
    pub value: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    /// Empty for property attributes (`a=recvonly`).
    pub value: String,
}

impl Attribute {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnInfo {
    pub net_type: String,
    pub addr_type: String,
    pub addr: String,
    pub ttl: Option<u16>,
}

impl ConnInfo {
    pub fn new(net_type: &str, addr_type: &str, addr: &str) -> Self {
        Self {
            net_type: net_type.to_string(),
            addr_type: addr_type.to_string(),
            addr: addr.to_string(),
            ttl: None,
        }
    }

    /// No connection line is written for a zero value.
    pub fn is_zero(&self) -> bool {
        self.net_type.is_empty() && self.addr_type.is_empty() && self.addr.is_empty()
    }
}

/// Origin (`o=`) plus the session-wide text fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Empty when the origin carried the `-` placeholder.
    pub user: String,
    pub id: u64,
    pub version: u64,
    pub origin: ConnInfo,
    pub name: String,
    pub info: String,
    pub uri: String,
}

/// A `t=` window. `None` on either side encodes the NTP value 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Interval {
    pub starts: Option<DateTime<Utc>>,
    pub ends: Option<DateTime<Utc>>,
}

impl Interval {
    pub fn from_ntp(start: u64, stop: u64) -> Result<Self> {
        Ok(Self {
            starts: ntp_to_utc(start)?,
            ends: ntp_to_utc(stop)?,
        })
    }

    pub fn to_ntp(&self) -> (u64, u64) {
        (utc_to_ntp(self.starts), utc_to_ntp(self.ends))
    }

    pub fn is_unbound(&self) -> bool {
        self.ends.is_none()
    }

    pub fn is_permanent(&self) -> bool {
        self.starts.is_none() && self.ends.is_none()
    }
}

fn ntp_to_utc(ntp: u64) -> Result<Option<DateTime<Utc>>> {
    if ntp == 0 {
        return Ok(None);
    }
    let secs = i64::try_from(ntp)
        .ok()
        .and_then(|n| n.checked_sub(NTP_EPOCH_OFFSET))
        .ok_or_else(|| SdpError::invalid(format!("ntp time {ntp} out of range")))?;
    DateTime::<Utc>::from_timestamp(secs, 0)
        .map(Some)
        .ok_or_else(|| SdpError::invalid(format!("ntp time {ntp} out of range")))
}

fn utc_to_ntp(time: Option<DateTime<Utc>>) -> u64 {
    match time {
        Some(t) => u64::try_from(t.timestamp() + NTP_EPOCH_OFFSET).unwrap_or(0),
        None => 0,
    }
}

/// Value of an RFC 4570 `a=source-filter` attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceInfo {
    pub mode: String,
    pub net_type: String,
    pub addr_type: String,
    pub addr: String,
    pub list: Vec<String>,
}

impl SourceInfo {
    pub fn is_include(&self) -> bool {
        self.mode == MODE_INCL
    }
}

/// One `m=` block and the lines that follow it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaInfo {
    pub media: String,
    pub port: u16,
    /// Zero when the `m=` line has no `/count` suffix.
    pub count: u16,
    pub proto: String,
    /// Format tokens after the protocol, kept verbatim.
    pub attrs: Vec<String>,
    pub info: String,
    pub conn_info: ConnInfo,
    pub bandwidth: Vec<Bandwidth>,
    pub attributes: Vec<Attribute>,
}

impl MediaInfo {
    pub fn port_range(&self) -> Vec<u16> {
        if self.count == 0 {
            return vec![self.port];
        }
        (0..self.count)
            .map_while(|i| self.port.checked_add(i))
            .collect()
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        find_attribute(&self.attributes, name)
    }

    pub fn source_filter(&self) -> Result<SourceInfo> {
        source_filter_in(&self.attributes)
    }

    /// Connection for this media, falling back to the session-level one.
    pub fn connection_or<'a>(&'a self, session: &'a ConnInfo) -> &'a ConnInfo {
        if self.conn_info.is_zero() {
            session
        } else {
            &self.conn_info
        }
    }
}

/// A complete session description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct File {
    pub version: u32,
    pub session: Session,
    pub email: Vec<String>,
    pub phone: Vec<String>,
    pub conn_info: ConnInfo,
    pub bandwidth: Vec<Bandwidth>,
    pub attributes: Vec<Attribute>,
    pub intervals: Vec<Interval>,
    pub medias: Vec<MediaInfo>,
}

impl File {
    /// Media category of every `m=` block, in document order.
    pub fn media_categories(&self) -> Vec<&str> {
        self.medias.iter().map(|m| m.media.as_str()).collect()
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        find_attribute(&self.attributes, name)
    }

    pub fn source_filter(&self) -> Result<SourceInfo> {
        source_filter_in(&self.attributes)
    }
}

fn find_attribute<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
    attrs.iter().find(|a| a.name == name)
}

fn source_filter_in(attrs: &[Attribute]) -> Result<SourceInfo> {
    let attr = find_attribute(attrs, SOURCE_FILTER)
        .ok_or(SdpError::MissingAttribute(SOURCE_FILTER))?;
    parse_source_filter(&attr.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media(port: u16, count: u16) -> MediaInfo {
        MediaInfo {
            media: MEDIA_AUDIO.into(),
            port,
            count,
            proto: "RTP/AVP".into(),
            ..Default::default()
        }
    }

    #[test]
    fn port_range_expands_count() {
        assert_eq!(media(5000, 0).port_range(), vec![5000]);
        assert_eq!(media(5004, 2).port_range(), vec![5004, 5005]);
        assert_eq!(media(u16::MAX, 3).port_range(), vec![u16::MAX]);
    }

    #[test]
    fn interval_flags() {
        let permanent = Interval::from_ntp(0, 0).unwrap();
        assert!(permanent.is_unbound());
        assert!(permanent.is_permanent());

        let open = Interval::from_ntp(3_034_423_619, 0).unwrap();
        assert_eq!(open.starts.unwrap().timestamp(), 825_434_819);
        assert!(open.is_unbound());
        assert!(!open.is_permanent());
        assert_eq!(open.to_ntp(), (3_034_423_619, 0));
    }

    #[test]
    fn conn_info_zero() {
        assert!(ConnInfo::default().is_zero());
        assert!(!ConnInfo::new(NET_TYPE_IN, ADDR_TYPE_IP4, "10.0.0.1").is_zero());
    }

    #[test]
    fn source_filter_lookup() {
        let mut m = media(5000, 0);
        assert!(matches!(
            m.source_filter(),
            Err(SdpError::MissingAttribute("source-filter"))
        ));

        m.attributes
            .push(Attribute::new("source-filter", "incl IN IP4 232.3.4.5 192.0.2.10"));
        let info = m.source_filter().unwrap();
        assert!(info.is_include());
        assert_eq!(info.addr, "232.3.4.5");
        assert_eq!(info.list, vec!["192.0.2.10".to_string()]);
    }

    #[test]
    fn media_connection_falls_back_to_session() {
        let session = ConnInfo::new(NET_TYPE_IN, ADDR_TYPE_IP4, "224.2.1.1");
        let mut m = media(5000, 0);
        assert_eq!(m.connection_or(&session).addr, "224.2.1.1");
        m.conn_info = ConnInfo::new(NET_TYPE_IN, ADDR_TYPE_IP4, "10.1.1.1");
        assert_eq!(m.connection_or(&session).addr, "10.1.1.1");
    }

    #[test]
    fn categories_follow_document_order() {
        let mut file = File::default();
        file.medias.push(media(1, 0));
        file.medias.push(MediaInfo {
            media: MEDIA_VIDEO.into(),
            ..Default::default()
        });
        assert_eq!(file.media_categories(), vec!["audio", "video"]);
    }
}
