//! Player input commands.

/// One tick of client input.
///
/// Only the low 16 bits of each angle and the low 3 bits of `double_tap` are
/// transmitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UserCmd {
    pub server_time: i32,
    pub angles: [i32; 3],
    pub forwardmove: i8,
    pub rightmove: i8,
    pub upmove: i8,
    pub buttons: u8,
    pub wbuttons: u8,
    pub weapon: u8,
    pub flags: u8,
    pub double_tap: u8,
    pub ident_client: u8,
}

impl UserCmd {
    /// Returns `true` when everything except the server time matches.
    #[must_use]
    pub fn same_input(&self, other: &Self) -> bool {
        Self {
            server_time: other.server_time,
            ..*self
        } == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_input_ignores_server_time() {
        let a = UserCmd {
            server_time: 100,
            forwardmove: 127,
            ..UserCmd::default()
        };
        let b = UserCmd {
            server_time: 350,
            ..a
        };
        assert!(a.same_input(&b));
        assert!(!a.same_input(&UserCmd { upmove: -1, ..b }));
    }
}
