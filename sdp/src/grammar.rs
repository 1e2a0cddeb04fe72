//! Parsers for the value part of individual SDP lines.

use heapless::Vec as BoundedVec;

use crate::model::{
    Attribute, Bandwidth, ConnInfo, Interval, MediaInfo, SourceInfo, ADDR_TYPE_IP4,
    ADDR_TYPE_IP6, MODE_EXCL, MODE_INCL, NET_TYPE_IN,
};
use crate::{Result, SdpError};

/// Where an address type is being checked. `*` is only an address type
/// inside `a=source-filter` (RFC 4570).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrContext {
    Connection,
    SourceFilter,
}

/// Splits `line` on single spaces into exactly `N` tokens.
pub fn fields<'a, const N: usize>(line: &'a str, what: &str) -> Result<BoundedVec<&'a str, N>> {
    let mut out: BoundedVec<&'a str, N> = BoundedVec::new();
    for part in line.split(' ') {
        out.push(part).map_err(|_| {
            SdpError::syntax(format!("{what}: expected {N} fields in {line:?}"))
        })?;
    }
    if out.len() != N {
        return Err(SdpError::syntax(format!(
            "{what}: expected {N} fields, found {} in {line:?}",
            out.len()
        )));
    }
    Ok(out)
}

pub fn valid_net_type(value: &str) -> Result<()> {
    if value == NET_TYPE_IN {
        return Ok(());
    }
    Err(SdpError::invalid(format!("unknown net type {value}")))
}

pub fn valid_addr_type(value: &str, ctx: AddrContext) -> Result<()> {
    match value {
        ADDR_TYPE_IP4 | ADDR_TYPE_IP6 => Ok(()),
        "*" if ctx == AddrContext::SourceFilter => Ok(()),
        _ => Err(SdpError::invalid(format!("unknown addr type {value}"))),
    }
}

pub fn valid_mode(value: &str) -> Result<()> {
    if value == MODE_INCL || value == MODE_EXCL {
        return Ok(());
    }
    Err(SdpError::invalid(format!("unknown mode type {value}")))
}

/// `<nettype> <addrtype> <address>[/<ttl>]`, already split.
pub fn parse_conn_info(parts: &[&str]) -> Result<ConnInfo> {
    let [net_type, addr_type, addr] = parts else {
        return Err(SdpError::syntax(format!(
            "connection: expected 3 fields, found {}",
            parts.len()
        )));
    };
    valid_net_type(net_type)?;
    valid_addr_type(addr_type, AddrContext::Connection)?;

    let mut info = ConnInfo::new(net_type, addr_type, addr);
    if let Some((host, ttl)) = addr.split_once('/') {
        if host.is_empty() {
            return Err(SdpError::syntax(format!("connection: empty address in {addr}")));
        }
        let ttl = ttl
            .parse::<u16>()
            .map_err(|e| SdpError::syntax(format!("connection: ttl {ttl:?}: {e}")))?;
        info.addr = host.to_string();
        info.ttl = Some(ttl);
    }
    Ok(info)
}

/// `c=` line value.
pub fn parse_connection_line(line: &str) -> Result<ConnInfo> {
    let parts = fields::<3>(line, "connection")?;
    parse_conn_info(&parts)
}

/// `b=<bwtype>:<bandwidth>`
pub fn parse_bandwidth(line: &str) -> Result<Bandwidth> {
    let (kind, value) = line
        .split_once(':')
        .filter(|(k, v)| !k.is_empty() && !v.is_empty())
        .ok_or_else(|| SdpError::syntax(format!("parsing bandwidth ({line})")))?;
    let value = value
        .parse::<i64>()
        .map_err(|e| SdpError::syntax(format!("bandwidth value {value:?}: {e}")))?;
    Ok(Bandwidth {
        kind: kind.to_string(),
        value,
    })
}

/// `a=<name>[:<value>]`. A line without a colon becomes a property
/// attribute with an empty value.
pub fn parse_attribute(line: &str) -> Attribute {
    match line.split_once(':') {
        Some((name, value)) => Attribute::new(name, value),
        None => Attribute::new(line, ""),
    }
}

/// `t=<start-time> <stop-time>` in NTP seconds.
pub fn parse_interval(line: &str) -> Result<Interval> {
    let parts = fields::<2>(line, "timing")?;
    let start = parse_ntp(parts[0])?;
    let stop = parse_ntp(parts[1])?;
    Interval::from_ntp(start, stop)
}

fn parse_ntp(value: &str) -> Result<u64> {
    value
        .parse::<u64>()
        .map_err(|e| SdpError::syntax(format!("timing value {value:?}: {e}")))
}

/// `m=<media> <port>[/<count>] <proto> <fmt> ...`
///
/// Only the line itself; the block's `i`, `c`, `b`, `a` lines are filled in
/// by the parser.
pub fn parse_media_line(line: &str) -> Result<MediaInfo> {
    let parts: Vec<&str> = line.split(' ').collect();
    if parts.len() < 4 {
        return Err(SdpError::syntax(format!("media: too few fields in {line:?}")));
    }

    let (port, count) = match parts[1].split_once('/') {
        Some((port, count)) => (parse_port(port)?, parse_port(count)?),
        None => (parse_port(parts[1])?, 0),
    };

    Ok(MediaInfo {
        media: parts[0].to_string(),
        port,
        count,
        proto: parts[2].to_string(),
        attrs: parts[3..].iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    })
}

fn parse_port(value: &str) -> Result<u16> {
    value
        .parse::<u16>()
        .map_err(|e| SdpError::syntax(format!("media port {value:?}: {e}")))
}

/// `<filter-mode> <nettype> <address-types> <dest-address> <src-list>`
pub fn parse_source_filter(value: &str) -> Result<SourceInfo> {
    if value.len() < 5 {
        return Err(SdpError::syntax(format!("source-filter too short: {value:?}")));
    }
    let parts: Vec<&str> = value.split(' ').collect();
    if parts.len() < 4 {
        return Err(SdpError::syntax(format!("source-filter: too few fields in {value:?}")));
    }
    valid_mode(parts[0])?;
    valid_net_type(parts[1])?;
    valid_addr_type(parts[2], AddrContext::SourceFilter)?;

    Ok(SourceInfo {
        mode: parts[0].to_string(),
        net_type: parts[1].to_string(),
        addr_type: parts[2].to_string(),
        addr: parts[3].to_string(),
        list: parts[4..].iter().map(|s| s.to_string()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_with_ttl() {
        let info = parse_connection_line("IN IP4 224.2.1.1/127").unwrap();
        assert_eq!(info.addr, "224.2.1.1");
        assert_eq!(info.ttl, Some(127));
        assert_eq!(info.addr_type, ADDR_TYPE_IP4);

        let plain = parse_connection_line("IN IP6 ::1").unwrap();
        assert_eq!(plain.addr, "::1");
        assert_eq!(plain.ttl, None);
    }

    #[test]
    fn connection_errors() {
        assert!(parse_connection_line("IN IP4").unwrap_err().is_syntax());
        assert!(parse_connection_line("IN IP4 1.2.3.4 extra").unwrap_err().is_syntax());
        assert!(parse_connection_line("ATM IP4 1.2.3.4").unwrap_err().is_invalid());
        assert!(parse_connection_line("IN IPX 1.2.3.4").unwrap_err().is_invalid());
        assert!(parse_connection_line("IN * 1.2.3.4").unwrap_err().is_invalid());
        assert!(parse_connection_line("IN IP4 1.2.3.4/abc").unwrap_err().is_syntax());
    }

    #[test]
    fn bandwidth_pairs() {
        let bw = parse_bandwidth("AS:64").unwrap();
        assert_eq!(bw.kind, "AS");
        assert_eq!(bw.value, 64);

        assert!(parse_bandwidth("AS:").unwrap_err().is_syntax());
        assert!(parse_bandwidth(":64").unwrap_err().is_syntax());
        assert!(parse_bandwidth("AS64").unwrap_err().is_syntax());
        assert!(parse_bandwidth("AS:sixty").unwrap_err().is_syntax());
    }

    #[test]
    fn attributes_split_on_first_colon() {
        assert_eq!(
            parse_attribute("rtpmap:96 opus/48000/2"),
            Attribute::new("rtpmap", "96 opus/48000/2")
        );
        assert_eq!(parse_attribute("fmtp:96 a=b:c").value, "96 a=b:c");
        assert_eq!(parse_attribute("recvonly"), Attribute::new("recvonly", ""));
    }

    #[test]
    fn timing_values() {
        let i = parse_interval("0 0").unwrap();
        assert!(i.is_unbound() && i.is_permanent());

        let i = parse_interval("3034423619 0").unwrap();
        assert_eq!(i.starts.unwrap().timestamp(), 825_434_819);
        assert!(i.is_unbound());

        assert!(parse_interval("0").unwrap_err().is_syntax());
        assert!(parse_interval("0 0 0").unwrap_err().is_syntax());
        assert!(parse_interval("-1 0").unwrap_err().is_syntax());
    }

    #[test]
    fn media_line_variants() {
        let m = parse_media_line("audio 49170 RTP/AVP 0 8 97").unwrap();
        assert_eq!(m.media, "audio");
        assert_eq!(m.port, 49170);
        assert_eq!(m.count, 0);
        assert_eq!(m.proto, "RTP/AVP");
        assert_eq!(m.attrs, vec!["0", "8", "97"]);

        let m = parse_media_line("video 5004/2 RTP/AVP 31").unwrap();
        assert_eq!((m.port, m.count), (5004, 2));

        assert!(parse_media_line("audio 49170 RTP/AVP").unwrap_err().is_syntax());
        assert!(parse_media_line("audio 70000 RTP/AVP 0").unwrap_err().is_syntax());
        assert!(parse_media_line("audio 5004/x RTP/AVP 0").unwrap_err().is_syntax());
    }

    #[test]
    fn source_filter_values() {
        let info = parse_source_filter("excl IN * 232.3.4.5 192.0.2.1 192.0.2.2").unwrap();
        assert!(!info.is_include());
        assert_eq!(info.addr_type, "*");
        assert_eq!(info.list.len(), 2);

        assert!(parse_source_filter("in").unwrap_err().is_syntax());
        assert!(parse_source_filter("incl IN IP4").unwrap_err().is_syntax());
        assert!(parse_source_filter("both IN IP4 1.2.3.4 5.6.7.8").unwrap_err().is_invalid());
        assert!(parse_source_filter("incl XX IP4 1.2.3.4 5.6.7.8").unwrap_err().is_invalid());
    }

    #[test]
    fn fixed_field_counts() {
        let parts = fields::<2>("a b", "test").unwrap();
        assert_eq!(&parts[..], &["a", "b"]);
        assert!(fields::<2>("a b c", "test").is_err());
        assert!(fields::<2>("a", "test").is_err());
    }
}
