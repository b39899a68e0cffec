//! Metadata extraction from provider free text.
//!
//! Providers embed candidate facts in text rather than structured fields:
//! debrid gateways emit `key:value` descriptor blocks, addon aggregators
//! append a stat line with seeders and size to the stream title.

mod descriptor;
mod stats;

pub use descriptor::{parse_descriptor, DescriptorBlock};
pub use stats::{flag_languages, parse_size, parse_torrent_stats, TorrentStats};
