//! Bitmapped array sections.
//!
//! A section is one umbrella bit, then for each group a changed bit, a bitmap
//! with one bit per slot, and the changed slot values in slot order.

use bitstream::{EntropyCoder, MsgBuffer};

use crate::error::CodecResult;

/// Wire width of one array slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotWidth {
    /// 16 bits, sign-extended on read.
    Short,
    /// 32 bits.
    Long,
}

/// One array compared against its reference.
///
/// Groups hold at most 32 slots; the bitmap is written with the slot count as
/// its width.
#[derive(Debug, Clone, Copy)]
pub struct Group<'a> {
    pub from: &'a [i32],
    pub to: &'a [i32],
    pub width: SlotWidth,
}

impl<'a> Group<'a> {
    #[must_use]
    pub const fn new(from: &'a [i32], to: &'a [i32], width: SlotWidth) -> Self {
        Self { from, to, width }
    }

    /// Bit `i` is set when slot `i` differs.
    #[must_use]
    pub fn bitmap(&self) -> u32 {
        self.from
            .iter()
            .zip(self.to)
            .enumerate()
            .filter(|(_, (old, new))| old != new)
            .fold(0, |bits, (slot, _)| {
                bits | 1u32.checked_shl(slot as u32).unwrap_or(0)
            })
    }
}

/// Writes one section. A section with no changes costs a single bit.
pub fn write_section<C: EntropyCoder>(
    msg: &mut MsgBuffer<'_, C>,
    groups: &[Group<'_>],
) -> CodecResult<()> {
    let bitmaps: Vec<u32> = groups.iter().map(Group::bitmap).collect();
    if bitmaps.iter().all(|bits| *bits == 0) {
        msg.write_bits(0, 1)?;
        return Ok(());
    }

    msg.write_bits(1, 1)?;
    for (group, bitmap) in groups.iter().zip(bitmaps) {
        if bitmap == 0 {
            msg.write_bits(0, 1)?;
            continue;
        }
        msg.write_bits(1, 1)?;
        msg.write_bits(bitmap as i32, group.to.len() as i32)?;
        for (slot, value) in group.to.iter().enumerate() {
            if bitmap & (1 << slot) == 0 {
                continue;
            }
            match group.width {
                SlotWidth::Short => msg.write_short(*value),
                SlotWidth::Long => msg.write_long(*value),
            }
        }
    }
    Ok(())
}

/// Reads one section into `groups`, leaving unflagged slots untouched.
///
/// Each slice should already hold the reference values.
pub fn read_section<'s, C, I>(msg: &mut MsgBuffer<'_, C>, groups: I) -> CodecResult<()>
where
    C: EntropyCoder,
    I: IntoIterator<Item = (&'s mut [i32], SlotWidth)>,
{
    if msg.read_bits(1)? == 0 {
        return Ok(());
    }

    for (slots, width) in groups {
        if msg.read_bits(1)? == 0 {
            continue;
        }
        let bitmap = msg.read_bits(slots.len() as i32)? as u32;
        for (slot, value) in slots.iter_mut().enumerate() {
            if bitmap & (1 << slot) == 0 {
                continue;
            }
            *value = match width {
                SlotWidth::Short => msg.read_short(),
                SlotWidth::Long => msg.read_long(),
            };
        }
    }
    Ok(())
}
