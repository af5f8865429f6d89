//! Export module for ledger-export
//!
//! Serializes accounts into accounting interchange formats:
//! - OFX: XML statements built as an element tree and rendered by `xml`
//! - QIF: line-based account and transaction records
//!
//! `qif_reader` parses QIF text back into account blocks.

pub mod ofx;
pub mod qif;
pub mod qif_reader;
pub mod xml;

pub use ofx::{export_ofx, format_ofx_time, to_ofx_type, OfxAccountType};
pub use qif::{export_qif, qif_header, AccountNameResolver};
pub use qif_reader::{parse_qif, QifAccountBlock, QifTransaction};
pub use xml::{XmlElement, XmlNode, XmlWriter};
