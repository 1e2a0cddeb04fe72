//! Session Description Protocol (RFC 4566) parsing and serialization.
//!
//! ```
//! let file: sdp::File = "v=0\r\no=- 1 1 IN IP4 127.0.0.1\r\ns=test\r\nm=audio 49170 RTP/AVP 0\r\n"
//!     .parse()
//!     .unwrap();
//! assert_eq!(file.media_categories(), vec!["audio"]);
//! assert!(file.serialize().starts_with("v=0\r\n"));
//! ```

mod cursor;
mod error;
pub mod grammar;
mod model;
mod parse;
mod serialize;

pub use cursor::LineCursor;
pub use error::{Result, SdpError};
pub use model::*;
pub use parse::{
    parse, parse_into, Limits, Parser, DEFAULT_MAX_LINE_LEN, DEFAULT_MAX_MEDIA,
    DEFAULT_MAX_REPEATED,
};
