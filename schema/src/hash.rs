//! Deterministic field table fingerprints.

use blake3::Hasher;

use crate::field::FieldKind;
use crate::table::{FieldScheme, FieldTable};

/// Computes a fingerprint over everything that shapes a table's wire layout.
///
/// Peers that exchange this value can detect a table that drifted from the
/// one they were built with before any delta is misread.
#[must_use]
pub fn table_hash<R: 'static>(table: &FieldTable<R>) -> u64 {
    let mut hasher = Hasher::new();
    write_str(&mut hasher, table.name);
    write_u8(
        &mut hasher,
        match table.scheme {
            FieldScheme::Guarded => 0,
            FieldScheme::Bare => 1,
        },
    );
    write_u32(&mut hasher, table.fields.len() as u32);

    for field in table.fields {
        write_str(&mut hasher, field.name);
        write_kind(&mut hasher, field.kind);
    }

    let hash = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(head)
}

fn write_kind(hasher: &mut Hasher, kind: FieldKind) {
    match kind {
        FieldKind::Float => {
            write_u8(hasher, 0);
        }
        FieldKind::Int { bits } => {
            write_u8(hasher, 1);
            write_u8(hasher, bits);
        }
        FieldKind::SignedInt { bits } => {
            write_u8(hasher, 2);
            write_u8(hasher, bits);
        }
    }
}

fn write_str(hasher: &mut Hasher, value: &str) {
    write_u32(hasher, value.len() as u32);
    hasher.update(value.as_bytes());
}

fn write_u8(hasher: &mut Hasher, value: u8) {
    hasher.update(&[value]);
}

fn write_u32(hasher: &mut Hasher, value: u32) {
    hasher.update(&value.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{net_field, NetField};
    use crate::{ENTITY_STATE_TABLE, PLAYER_STATE_TABLE};

    #[derive(Default)]
    struct Probe {
        a: i32,
        b: f32,
    }

    static AB: [NetField<Probe>; 2] = [net_field!(Probe, "a", 8, a), net_field!(Probe, "b", 0, b)];
    static BA: [NetField<Probe>; 2] = [net_field!(Probe, "b", 0, b), net_field!(Probe, "a", 8, a)];
    static A_SIGNED: [NetField<Probe>; 2] =
        [net_field!(Probe, "a", -8, a), net_field!(Probe, "b", 0, b)];

    #[test]
    fn table_hash_is_stable() {
        assert_eq!(
            table_hash(&ENTITY_STATE_TABLE),
            table_hash(&ENTITY_STATE_TABLE)
        );
        assert_ne!(
            table_hash(&ENTITY_STATE_TABLE),
            table_hash(&PLAYER_STATE_TABLE)
        );
    }

    #[test]
    fn table_hash_changes_with_field_order() {
        let ab = FieldTable::new("probe", FieldScheme::Guarded, &AB);
        let ba = FieldTable::new("probe", FieldScheme::Guarded, &BA);
        assert_ne!(table_hash(&ab), table_hash(&ba));
    }

    #[test]
    fn table_hash_changes_with_signedness_and_scheme() {
        let ab = FieldTable::new("probe", FieldScheme::Guarded, &AB);
        let signed = FieldTable::new("probe", FieldScheme::Guarded, &A_SIGNED);
        let bare = FieldTable::new("probe", FieldScheme::Bare, &AB);
        assert_ne!(table_hash(&ab), table_hash(&signed));
        assert_ne!(table_hash(&ab), table_hash(&bare));
    }

    #[test]
    fn table_hash_ignores_record_word_declaration() {
        let plain = FieldTable::new("probe", FieldScheme::Guarded, &AB);
        let declared = FieldTable::new("probe", FieldScheme::Guarded, &AB).mirrors_record();
        assert_eq!(table_hash(&plain), table_hash(&declared));
    }
}
