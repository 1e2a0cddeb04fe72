//! Canonical SDP output.
//!
//! Lines are always written in field order and terminated by CRLF, no
//! matter how the [`File`] was assembled.

use core::fmt::{self, Write};
use std::io;

use crate::model::{Attribute, Bandwidth, ConnInfo, File, Interval, MediaInfo, Session};

const EOL: &str = "\r\n";

impl File {
    pub fn serialize(&self) -> String {
        self.to_string()
    }

    pub fn write_to<W: io::Write>(&self, mut w: W) -> io::Result<()> {
        write!(w, "{self}")?;
        w.flush()
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v={}{EOL}", self.version)?;
        write_session(f, &self.session)?;
        for email in &self.email {
            write!(f, "e={email}{EOL}")?;
        }
        for phone in &self.phone {
            write!(f, "p={phone}{EOL}")?;
        }
        write_conn_line(f, &self.conn_info)?;
        write_bandwidths(f, &self.bandwidth)?;
        write_intervals(f, &self.intervals)?;
        write_attributes(f, &self.attributes)?;
        for media in &self.medias {
            write_media(f, media)?;
        }
        Ok(())
    }
}

fn write_session<W: Write>(w: &mut W, session: &Session) -> fmt::Result {
    let user = if session.user.is_empty() {
        "-"
    } else {
        session.user.as_str()
    };
    write!(w, "o={user} {} {} ", session.id, session.version)?;
    write_conn_info(w, &session.origin)?;
    w.write_str(EOL)?;

    write!(w, "s={}{EOL}", session.name)?;
    if !session.info.is_empty() {
        write!(w, "i={}{EOL}", session.info)?;
    }
    if !session.uri.is_empty() {
        write!(w, "u={}{EOL}", session.uri)?;
    }
    Ok(())
}

fn write_media<W: Write>(w: &mut W, media: &MediaInfo) -> fmt::Result {
    write!(w, "m={} {}", media.media, media.port)?;
    if media.count > 0 {
        write!(w, "/{}", media.count)?;
    }
    write!(w, " {}", media.proto)?;
    for attr in &media.attrs {
        write!(w, " {attr}")?;
    }
    w.write_str(EOL)?;

    if !media.info.is_empty() {
        write!(w, "i={}{EOL}", media.info)?;
    }
    write_conn_line(w, &media.conn_info)?;
    write_bandwidths(w, &media.bandwidth)?;
    write_attributes(w, &media.attributes)
}

fn write_conn_line<W: Write>(w: &mut W, conn: &ConnInfo) -> fmt::Result {
    if conn.is_zero() {
        return Ok(());
    }
    w.write_str("c=")?;
    write_conn_info(w, conn)?;
    w.write_str(EOL)
}

fn write_conn_info<W: Write>(w: &mut W, conn: &ConnInfo) -> fmt::Result {
    write!(w, "{} {} {}", conn.net_type, conn.addr_type, conn.addr)?;
    if let Some(ttl) = conn.ttl {
        write!(w, "/{ttl}")?;
    }
    Ok(())
}

fn write_bandwidths<W: Write>(w: &mut W, bandwidths: &[Bandwidth]) -> fmt::Result {
    for bw in bandwidths {
        write!(w, "b={}:{}{EOL}", bw.kind, bw.value)?;
    }
    Ok(())
}

fn write_intervals<W: Write>(w: &mut W, intervals: &[Interval]) -> fmt::Result {
    for interval in intervals {
        let (start, stop) = interval.to_ntp();
        write!(w, "t={start} {stop}{EOL}")?;
    }
    Ok(())
}

fn write_attributes<W: Write>(w: &mut W, attrs: &[Attribute]) -> fmt::Result {
    for attr in attrs {
        if attr.value.is_empty() {
            write!(w, "a={}{EOL}", attr.name)?;
        } else {
            write!(w, "a={}:{}{EOL}", attr.name, attr.value)?;
        }
    }
    Ok(())
}
