//! Small ergonomic constructors for the oneof-heavy reply types. These sit
//! alongside the generated protobuf code rather than inside it, the same
//! way hand-written convenience methods are layered onto prost output
//! elsewhere in this ecosystem.

use crate::{
    append_reply, discard_reply, info_reply, read_reply, AppendReply, DiscardReply, Entry,
    InfoReply, ReadReply, Redirect,
};

impl AppendReply {
    pub fn ok(sequence: u64, indexes: Vec<u64>) -> Self {
        AppendReply {
            result: Some(append_reply::Result::Ok(append_reply::Ok {
                sequence,
                indexes,
            })),
        }
    }

    pub fn redirect(host: impl Into<String>) -> Self {
        AppendReply {
            result: Some(append_reply::Result::Redirect(Redirect { host: host.into() })),
        }
    }

    pub fn full() -> Self {
        AppendReply {
            result: Some(append_reply::Result::Full(true)),
        }
    }
}

impl DiscardReply {
    pub fn ok() -> Self {
        DiscardReply {
            result: Some(discard_reply::Result::Ok(discard_reply::Ok {})),
        }
    }

    pub fn redirect(host: impl Into<String>) -> Self {
        DiscardReply {
            result: Some(discard_reply::Result::Redirect(Redirect { host: host.into() })),
        }
    }
}

impl ReadReply {
    pub fn ok(entries: Vec<Entry>) -> Self {
        ReadReply {
            result: Some(read_reply::Result::Ok(read_reply::Ok { entries })),
        }
    }

    pub fn redirect(host: impl Into<String>) -> Self {
        ReadReply {
            result: Some(read_reply::Result::Redirect(Redirect { host: host.into() })),
        }
    }

    pub fn truncated() -> Self {
        ReadReply {
            result: Some(read_reply::Result::Truncated(true)),
        }
    }
}

impl InfoReply {
    pub fn ok(first_index: u64, last_index: u64, bytes_used: u64, bytes_total: u64) -> Self {
        InfoReply {
            result: Some(info_reply::Result::Ok(info_reply::Ok {
                first_index,
                last_index,
                bytes_used,
                bytes_total,
            })),
        }
    }

    pub fn redirect(host: impl Into<String>) -> Self {
        InfoReply {
            result: Some(info_reply::Result::Redirect(Redirect { host: host.into() })),
        }
    }
}
