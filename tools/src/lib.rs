//! Developer tools for the tickwire codec.
//!
//! This crate backs the `tickwire-tools` binary:
//!
//! - Encode a JSON record as a delta and check it decodes back
//! - Decode a hex delta into JSON
//! - Size a sequence of records and report which fields change
//! - Print field table fingerprints
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Make it easy to understand what the codec is doing.

use std::fmt::Write as _;

use anyhow::{bail, ensure, Context, Result};
use bitstream::{EntropyCoder, HuffmanCoder, MsgBuffer, RawCoder};
use clap::ValueEnum;
use codec::{
    read_delta_entity, read_delta_player_state, read_entity_number, write_delta_entity_observed,
    write_delta_player_state_observed, ChangeStats, FieldCount, NoopObserver,
};
use schema::{
    table_hash, EntityState, PlayerState, ENTITY_STATE_TABLE, PLAYER_STATE_TABLE,
};
use serde::Serialize;

const SCRATCH_BYTES: usize = 16 * 1024;

/// Record type a command operates on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RecordKind {
    Entity,
    Player,
}

impl RecordKind {
    /// Name of the field table behind this record kind.
    #[must_use]
    pub fn table_name(self) -> &'static str {
        match self {
            Self::Entity => ENTITY_STATE_TABLE.name,
            Self::Player => PLAYER_STATE_TABLE.name,
        }
    }
}

/// The in-band coder selected on the command line.
#[derive(Debug, Clone)]
pub enum Coder {
    Raw(RawCoder),
    Huffman(HuffmanCoder),
}

impl Coder {
    /// A Huffman coder trained on `sample`, or the raw coder without one.
    #[must_use]
    pub fn from_sample(sample: Option<&[u8]>) -> Self {
        match sample {
            Some(bytes) => Self::Huffman(HuffmanCoder::train(bytes)),
            None => Self::Raw(RawCoder),
        }
    }
}

impl EntropyCoder for Coder {
    fn put_bit(&self, buf: &mut [u8], bit_pos: usize, bit: bool) {
        match self {
            Self::Raw(coder) => coder.put_bit(buf, bit_pos, bit),
            Self::Huffman(coder) => coder.put_bit(buf, bit_pos, bit),
        }
    }

    fn put_symbol(&self, buf: &mut [u8], bit_pos: usize, symbol: u8) -> usize {
        match self {
            Self::Raw(coder) => coder.put_symbol(buf, bit_pos, symbol),
            Self::Huffman(coder) => coder.put_symbol(buf, bit_pos, symbol),
        }
    }

    fn get_bit(&self, buf: &[u8], bit_pos: usize) -> bool {
        match self {
            Self::Raw(coder) => coder.get_bit(buf, bit_pos),
            Self::Huffman(coder) => coder.get_bit(buf, bit_pos),
        }
    }

    fn get_symbol(&self, buf: &[u8], bit_pos: usize) -> (u8, usize) {
        match self {
            Self::Raw(coder) => coder.get_symbol(buf, bit_pos),
            Self::Huffman(coder) => coder.get_symbol(buf, bit_pos),
        }
    }
}

/// Result of encoding one delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodeReport {
    pub bits: usize,
    pub bytes: Vec<u8>,
}

impl EncodeReport {
    #[must_use]
    pub fn hex(&self) -> String {
        to_hex(&self.bytes)
    }
}

/// Size of a record sequence and the fields that drove it.
#[derive(Debug, Clone, Serialize)]
pub struct SizeReport {
    pub table: &'static str,
    pub records: usize,
    pub total_bits: usize,
    pub wasted_bits: u64,
    pub fields: Vec<FieldRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldRow {
    pub index: usize,
    pub name: &'static str,
    pub changes: u64,
}

impl From<FieldCount> for FieldRow {
    fn from(count: FieldCount) -> Self {
        Self {
            index: count.index,
            name: count.name,
            changes: count.count,
        }
    }
}

/// One field table's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableFingerprint {
    pub name: &'static str,
    pub fields: usize,
    pub hash: u64,
}

/// Encodes `to` against `from` (JSON records) and decodes the result back.
///
/// An absent `from` means an all-zero reference.
pub fn encode_delta(
    kind: RecordKind,
    from: Option<&str>,
    to: &str,
    force: bool,
    coder: &Coder,
) -> Result<EncodeReport> {
    let mut buf = vec![0u8; SCRATCH_BYTES];
    let mut msg = MsgBuffer::init(&mut buf).with_coder(coder);

    match kind {
        RecordKind::Entity => {
            let from = from.map(parse::<EntityState>).transpose()?;
            let to = parse::<EntityState>(to)?;
            write_delta_entity_observed(&mut msg, from.as_ref(), Some(&to), force, NoopObserver)?;
            if msg.bits_written() > 0 {
                msg.begin_reading();
                let number = read_entity_number(&mut msg)?;
                let decoded = read_delta_entity(&mut msg, &from.unwrap_or_default(), number)?;
                ensure!(decoded == to, "entity delta did not decode back to its target");
            }
        }
        RecordKind::Player => {
            let from = from.map(parse::<PlayerState>).transpose()?;
            let to = parse::<PlayerState>(to)?;
            write_delta_player_state_observed(&mut msg, from.as_ref(), &to, NoopObserver)?;
            msg.begin_reading();
            let decoded = read_delta_player_state(&mut msg, from.as_ref())?;
            ensure!(decoded == to, "player delta did not decode back to its target");
        }
    }
    ensure!(!msg.is_overflowed(), "delta does not fit in {SCRATCH_BYTES} bytes");

    let bits = msg.bits_written();
    let bytes = msg.as_bytes().to_vec();
    tracing::debug!(?kind, bits, bytes = bytes.len(), "delta encoded");
    Ok(EncodeReport { bits, bytes })
}

/// Decodes a hex delta against `from` and returns the record as pretty JSON.
pub fn decode_delta(
    kind: RecordKind,
    from: Option<&str>,
    hex: &str,
    coder: &Coder,
) -> Result<String> {
    let mut bytes = parse_hex(hex)?;
    let len = bytes.len();
    let mut msg = MsgBuffer::init(&mut bytes).with_len(len).with_coder(coder);
    msg.begin_reading();

    let json = match kind {
        RecordKind::Entity => {
            let from = from.map(parse::<EntityState>).transpose()?.unwrap_or_default();
            let number = read_entity_number(&mut msg)?;
            let decoded = read_delta_entity(&mut msg, &from, number)?;
            serde_json::to_string_pretty(&decoded)
        }
        RecordKind::Player => {
            let from = from.map(parse::<PlayerState>).transpose()?;
            let decoded = read_delta_player_state(&mut msg, from.as_ref())?;
            serde_json::to_string_pretty(&decoded)
        }
    };
    json.context("serialize decoded record")
}

/// Encodes each record of a JSON array against the one before it.
pub fn size_report(kind: RecordKind, records: &str, coder: &Coder) -> Result<SizeReport> {
    let mut stats = ChangeStats::new();
    let mut buf = vec![0u8; SCRATCH_BYTES];
    let mut total_bits = 0;

    let count = match kind {
        RecordKind::Entity => {
            let records: Vec<EntityState> = parse(records)?;
            let mut previous: Option<&EntityState> = None;
            for record in &records {
                let mut msg = MsgBuffer::init(&mut buf).with_coder(coder);
                write_delta_entity_observed(&mut msg, previous, Some(record), false, &mut stats)?;
                total_bits += checked_bits(&msg)?;
                previous = Some(record);
            }
            records.len()
        }
        RecordKind::Player => {
            let records: Vec<PlayerState> = parse(records)?;
            let mut previous: Option<&PlayerState> = None;
            for record in &records {
                let mut msg = MsgBuffer::init(&mut buf).with_coder(coder);
                write_delta_player_state_observed(&mut msg, previous, record, &mut stats)?;
                total_bits += checked_bits(&msg)?;
                previous = Some(record);
            }
            records.len()
        }
    };

    let table = kind.table_name();
    Ok(SizeReport {
        table,
        records: count,
        total_bits,
        wasted_bits: stats.wasted_bits(table),
        fields: stats.report(table).into_iter().map(FieldRow::from).collect(),
    })
}

fn checked_bits<C: EntropyCoder>(msg: &MsgBuffer<'_, C>) -> Result<usize> {
    if msg.is_overflowed() {
        bail!("record delta does not fit in {SCRATCH_BYTES} bytes");
    }
    Ok(msg.bits_written())
}

/// Fingerprints of every shipped field table.
#[must_use]
pub fn fingerprints() -> Vec<TableFingerprint> {
    vec![
        TableFingerprint {
            name: ENTITY_STATE_TABLE.name,
            fields: ENTITY_STATE_TABLE.len(),
            hash: table_hash(&ENTITY_STATE_TABLE),
        },
        TableFingerprint {
            name: PLAYER_STATE_TABLE.name,
            fields: PLAYER_STATE_TABLE.len(),
            hash: table_hash(&PLAYER_STATE_TABLE),
        },
    ]
}

/// Formats a size report for the terminal.
#[must_use]
pub fn format_report_pretty(report: &SizeReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}: {} records, {} bits ({} bytes)",
        report.table,
        report.records,
        report.total_bits,
        report.total_bits.div_ceil(8)
    );
    let _ = writeln!(out, "unchanged-field bits: {}", report.wasted_bits);
    if !report.fields.is_empty() {
        let _ = writeln!(out, "changed fields:");
        for row in &report.fields {
            let _ = writeln!(out, "  {:>3} {:<28} {}", row.index, row.name, row.changes);
        }
    }
    out
}

/// Lowercase hex without separators.
#[must_use]
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, byte| {
        let _ = write!(out, "{byte:02x}");
        out
    })
}

/// Parses hex digits, ignoring ASCII whitespace.
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let digits: Vec<u8> = text.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    ensure!(digits.len() % 2 == 0, "hex input has an odd number of digits");
    digits
        .chunks(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair).context("hex input is not ASCII")?;
            u8::from_str_radix(pair, 16).with_context(|| format!("invalid hex byte {pair:?}"))
        })
        .collect()
}

fn parse<T: serde::de::DeserializeOwned>(json: &str) -> Result<T> {
    serde_json::from_str(json).context("parse record json")
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOVED: &str = r#"{"number": 5, "e_type": 1, "origin": [17.5, 0.0, 0.0]}"#;

    #[test]
    fn encode_entity_from_partial_json() {
        let report = encode_delta(
            RecordKind::Entity,
            Some(r#"{"number": 5, "e_type": 1}"#),
            MOVED,
            false,
            &Coder::from_sample(None),
        )
        .unwrap();
        // number, flags, lc, 22 unchanged bits, changed raw float
        assert_eq!(report.bits, 10 + 2 + 8 + 22 + 3 + 32);
        assert_eq!(report.bytes.len(), report.bits / 8 + 1);
    }

    #[test]
    fn unchanged_entity_encodes_to_nothing() {
        let report = encode_delta(
            RecordKind::Entity,
            Some(MOVED),
            MOVED,
            false,
            &Coder::from_sample(None),
        )
        .unwrap();
        assert_eq!(report.bits, 0);
        assert!(report.bytes.is_empty());
    }

    #[test]
    fn encode_then_decode_through_hex() {
        let coder = Coder::from_sample(Some(b"\x00\x00\x00\x01\x05"));
        let report = encode_delta(RecordKind::Entity, None, MOVED, false, &coder).unwrap();
        let json = decode_delta(RecordKind::Entity, None, &report.hex(), &coder).unwrap();
        let decoded: EntityState = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.number, 5);
        assert!((decoded.origin[0] - 17.5).abs() < f32::EPSILON);
    }

    #[test]
    fn player_roundtrip_with_arrays() {
        let to = r#"{"command_time": 10, "stats": [100, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]}"#;
        let coder = Coder::from_sample(None);
        let report = encode_delta(RecordKind::Player, None, to, false, &coder).unwrap();
        let json = decode_delta(RecordKind::Player, None, &report.hex(), &coder).unwrap();
        let decoded: PlayerState = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.command_time, 10);
        assert_eq!(decoded.stats[0], 100);
    }

    #[test]
    fn size_report_counts_changes() {
        let records = r#"[
            {"number": 1, "origin": [1.0, 0.0, 0.0]},
            {"number": 1, "origin": [2.0, 0.0, 0.0]},
            {"number": 1, "origin": [3.0, 0.0, 0.0], "event": 4}
        ]"#;
        let report = size_report(RecordKind::Entity, records, &Coder::from_sample(None)).unwrap();
        assert_eq!(report.records, 3);
        assert!(report.total_bits > 0);
        let origin = report.fields.iter().find(|row| row.name == "origin[0]").unwrap();
        assert_eq!(origin.changes, 3);
        assert!(format_report_pretty(&report).contains("origin[0]"));
    }

    #[test]
    fn fingerprints_are_distinct() {
        let prints = fingerprints();
        assert_eq!(prints.len(), 2);
        assert_eq!(prints[0].fields, 71);
        assert_eq!(prints[1].fields, 77);
        assert_ne!(prints[0].hash, prints[1].hash);
    }

    #[test]
    fn kinds_name_their_tables() {
        assert_eq!(RecordKind::Entity.table_name(), "entity_state");
        assert_eq!(RecordKind::Player.table_name(), "player_state");
    }

    #[test]
    fn hex_roundtrip_and_errors() {
        assert_eq!(to_hex(&[0x00, 0xAB, 0x10]), "00ab10");
        assert_eq!(parse_hex("00 ab\n10").unwrap(), vec![0x00, 0xAB, 0x10]);
        assert!(parse_hex("abc").is_err());
        assert!(parse_hex("zz").is_err());
    }

    #[test]
    fn bad_json_is_reported() {
        let err = encode_delta(
            RecordKind::Entity,
            None,
            "{not json",
            false,
            &Coder::from_sample(None),
        )
        .unwrap_err();
        assert!(err.to_string().contains("parse record json"));
    }
}
