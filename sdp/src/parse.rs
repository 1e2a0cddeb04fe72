//! Ordered, single-pass SDP parser.
//!
//! SDP fields must appear in a fixed sequence, so the parser walks a table
//! of `(tag, handler)` slots instead of dispatching on each line's type.
//! Every slot consumes one mandatory line, an optional line, or a run of
//! lines with the same tag; once a slot is passed it is never revisited.
//! `m=` lines open a media block that is parsed with its own, shorter table.

use std::io::{BufRead, BufReader, Read};
use std::str::FromStr;

use log::debug;

use crate::cursor::LineCursor;
use crate::grammar::{
    fields, parse_attribute, parse_bandwidth, parse_conn_info, parse_connection_line,
    parse_interval, parse_media_line,
};
use crate::model::{File, MediaInfo};
use crate::{Result, SdpError};

pub const DEFAULT_MAX_LINE_LEN: usize = 4096;
pub const DEFAULT_MAX_MEDIA: usize = 64;
pub const DEFAULT_MAX_REPEATED: usize = 4096;

/// Upper bounds on what a single parse will accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_line_len: usize,
    pub max_media: usize,
    /// Per slot, e.g. the `a=` lines of one media block.
    pub max_repeated: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_line_len: DEFAULT_MAX_LINE_LEN,
            max_media: DEFAULT_MAX_MEDIA,
            max_repeated: DEFAULT_MAX_REPEATED,
        }
    }
}

type Handler<T> = fn(&mut Parser<'_>, &mut T, u8) -> Result<()>;

struct Slot<T> {
    tag: u8,
    handler: Handler<T>,
}

const SESSION_SLOTS: &[Slot<File>] = &[
    Slot { tag: b'v', handler: parse_version },
    Slot { tag: b'o', handler: parse_origin },
    Slot { tag: b's', handler: parse_name },
    Slot { tag: b'i', handler: parse_info },
    Slot { tag: b'u', handler: parse_uri },
    Slot { tag: b'e', handler: parse_email },
    Slot { tag: b'p', handler: parse_phone },
    Slot { tag: b'c', handler: parse_conn },
    Slot { tag: b'b', handler: parse_bandwidths },
    Slot { tag: b't', handler: parse_intervals },
    Slot { tag: b'a', handler: parse_attributes },
    Slot { tag: b'r', handler: skip },
    Slot { tag: b'z', handler: skip },
    Slot { tag: b'm', handler: parse_medias },
];

const MEDIA_SLOTS: &[Slot<MediaInfo>] = &[
    Slot { tag: b'i', handler: parse_media_info },
    Slot { tag: b'c', handler: parse_media_conn },
    Slot { tag: b'b', handler: parse_media_bandwidths },
    Slot { tag: b'a', handler: parse_media_attributes },
];

/// Parses a complete session description from `reader`.
///
/// Uses [`Limits::default`]: lines up to 4096 bytes, 64 media blocks and
/// 4096 lines per repeated slot. Use [`Parser::with_limits`] for other
/// bounds.
pub fn parse<R: Read>(reader: R) -> Result<File> {
    let mut file = File::default();
    parse_into(BufReader::new(reader), &mut file)?;
    Ok(file)
}

/// Like [`parse`], but fills `file` in place so whatever was read before a
/// failure stays inspectable. A `file` left behind by an error is not a
/// valid description.
pub fn parse_into<R: BufRead>(mut reader: R, file: &mut File) -> Result<()> {
    Parser::new(&mut reader).run(file)
}

impl FromStr for File {
    type Err = SdpError;

    fn from_str(s: &str) -> Result<Self> {
        parse(s.as_bytes())
    }
}

pub struct Parser<'a> {
    cursor: LineCursor<&'a mut dyn BufRead>,
    limits: Limits,
}

impl<'a> Parser<'a> {
    pub fn new(reader: &'a mut dyn BufRead) -> Self {
        Self::with_limits(reader, Limits::default())
    }

    pub fn with_limits(reader: &'a mut dyn BufRead, limits: Limits) -> Self {
        Self {
            cursor: LineCursor::new(reader, limits.max_line_len),
            limits,
        }
    }

    pub fn run(&mut self, file: &mut File) -> Result<()> {
        debug!("parsing session description");
        self.apply(SESSION_SLOTS, file)?;
        if !self.cursor.at_end()? {
            return Err(SdpError::syntax(format!(
                "unexpected line after line {}",
                self.cursor.line_no()
            )));
        }
        debug!(
            "parsed session {:?} with {} media block(s)",
            file.session.name,
            file.medias.len()
        );
        Ok(())
    }

    fn apply<T>(&mut self, slots: &[Slot<T>], target: &mut T) -> Result<()> {
        for slot in slots {
            (slot.handler)(self, target, slot.tag)?;
        }
        Ok(())
    }

    fn required(&mut self, tag: u8) -> Result<String> {
        self.cursor.consume_line(tag)
    }

    fn optional(&mut self, tag: u8) -> Result<Option<String>> {
        if !self.cursor.peek_prefix(tag)? {
            return Ok(None);
        }
        self.cursor.consume_line(tag).map(Some)
    }

    /// Collects every consecutive `tag` line through `each`.
    fn repeated<V>(
        &mut self,
        tag: u8,
        mut each: impl FnMut(String) -> Result<V>,
    ) -> Result<Vec<V>> {
        let mut out = Vec::new();
        while self.cursor.peek_prefix(tag)? {
            if out.len() == self.limits.max_repeated {
                return Err(SdpError::invalid(format!(
                    "more than {} {}= lines",
                    self.limits.max_repeated, tag as char
                )));
            }
            let line = self.cursor.consume_line(tag)?;
            out.push(each(line)?);
        }
        Ok(out)
    }
}

fn parse_version(p: &mut Parser<'_>, file: &mut File, tag: u8) -> Result<()> {
    let line = p.required(tag)?;
    file.version = line
        .parse::<u32>()
        .map_err(|e| SdpError::syntax(format!("version {line:?}: {e}")))?;
    if file.version != 0 {
        return Err(SdpError::invalid(format!("unsupported version {}", file.version)));
    }
    Ok(())
}

/// `o=<username> <sess-id> <sess-version> <nettype> <addrtype> <unicast-address>`
fn parse_origin(p: &mut Parser<'_>, file: &mut File, tag: u8) -> Result<()> {
    let line = p.required(tag)?;
    let parts = fields::<6>(&line, "origin")?;
    let session = &mut file.session;
    if parts[0] != "-" {
        session.user = parts[0].to_string();
    }
    session.id = parts[1]
        .parse::<u64>()
        .map_err(|e| SdpError::syntax(format!("session id {:?}: {e}", parts[1])))?;
    session.version = parts[2]
        .parse::<u64>()
        .map_err(|e| SdpError::syntax(format!("session version {:?}: {e}", parts[2])))?;
    session.origin = parse_conn_info(&parts[3..])?;
    Ok(())
}

fn parse_name(p: &mut Parser<'_>, file: &mut File, tag: u8) -> Result<()> {
    let line = p.required(tag)?;
    if line.is_empty() {
        return Err(SdpError::syntax("empty session name"));
    }
    file.session.name = line;
    Ok(())
}

fn parse_info(p: &mut Parser<'_>, file: &mut File, tag: u8) -> Result<()> {
    file.session.info = p.optional(tag)?.unwrap_or_default();
    Ok(())
}

fn parse_uri(p: &mut Parser<'_>, file: &mut File, tag: u8) -> Result<()> {
    file.session.uri = p.optional(tag)?.unwrap_or_default();
    Ok(())
}

fn parse_email(p: &mut Parser<'_>, file: &mut File, tag: u8) -> Result<()> {
    file.email = p.repeated(tag, Ok)?;
    Ok(())
}

fn parse_phone(p: &mut Parser<'_>, file: &mut File, tag: u8) -> Result<()> {
    file.phone = p.repeated(tag, Ok)?;
    Ok(())
}

fn parse_conn(p: &mut Parser<'_>, file: &mut File, tag: u8) -> Result<()> {
    if let Some(line) = p.optional(tag)? {
        file.conn_info = parse_connection_line(&line)?;
    }
    Ok(())
}

fn parse_bandwidths(p: &mut Parser<'_>, file: &mut File, tag: u8) -> Result<()> {
    file.bandwidth = p.repeated(tag, |line| parse_bandwidth(&line))?;
    Ok(())
}

fn parse_intervals(p: &mut Parser<'_>, file: &mut File, tag: u8) -> Result<()> {
    file.intervals = p.repeated(tag, |line| parse_interval(&line))?;
    Ok(())
}

fn parse_attributes(p: &mut Parser<'_>, file: &mut File, tag: u8) -> Result<()> {
    file.attributes = p.repeated(tag, |line| Ok(parse_attribute(&line)))?;
    Ok(())
}

/// Repeat times and time zones are read but not kept.
fn skip(p: &mut Parser<'_>, _: &mut File, tag: u8) -> Result<()> {
    let skipped = p.repeated(tag, |_| Ok(()))?;
    if !skipped.is_empty() {
        debug!("discarded {} {}= line(s)", skipped.len(), tag as char);
    }
    Ok(())
}

fn parse_medias(p: &mut Parser<'_>, file: &mut File, tag: u8) -> Result<()> {
    while p.cursor.peek_prefix(tag)? {
        if file.medias.len() == p.limits.max_media {
            return Err(SdpError::invalid(format!(
                "more than {} media descriptions",
                p.limits.max_media
            )));
        }
        let line = p.required(tag)?;
        let mut media = parse_media_line(&line)?;
        let result = p.apply(MEDIA_SLOTS, &mut media);
        file.medias.push(media);
        result?;
    }
    Ok(())
}

fn parse_media_info(p: &mut Parser<'_>, media: &mut MediaInfo, tag: u8) -> Result<()> {
    media.info = p.optional(tag)?.unwrap_or_default();
    Ok(())
}

fn parse_media_conn(p: &mut Parser<'_>, media: &mut MediaInfo, tag: u8) -> Result<()> {
    if let Some(line) = p.optional(tag)? {
        media.conn_info = parse_connection_line(&line)?;
    }
    Ok(())
}

fn parse_media_bandwidths(p: &mut Parser<'_>, media: &mut MediaInfo, tag: u8) -> Result<()> {
    media.bandwidth = p.repeated(tag, |line| parse_bandwidth(&line))?;
    Ok(())
}

fn parse_media_attributes(p: &mut Parser<'_>, media: &mut MediaInfo, tag: u8) -> Result<()> {
    media.attributes = p.repeated(tag, |line| Ok(parse_attribute(&line)))?;
    Ok(())
}
