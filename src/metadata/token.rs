//! Metadata tokens.
//!
//! A token names a row of a metadata table: the table id sits in the high byte, the 1-based
//! row id in the low 24 bits. `0x06000001` is the first `MethodDef` row.

use std::fmt;

use crate::metadata::tables::TableId;

/// A metadata token (ECMA-335 II.22).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token(pub u32);

impl Token {
    /// Creates a token from its raw value.
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Creates the token of row `rid` in `table`.
    #[must_use]
    pub fn from_row(table: TableId, rid: u32) -> Self {
        Token((u32::from(table as u8) << 24) | (rid & 0x00FF_FFFF))
    }

    /// The raw token value.
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// The table id in the high byte.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// The 1-based row id.
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_parts() {
        let token = Token::new(0x0600_0001);
        assert_eq!(token.value(), 0x0600_0001);
        assert_eq!(token.table(), 0x06);
        assert_eq!(token.row(), 1);

        let token = Token(0x06FF_FFFF);
        assert_eq!(token.row(), 0x00FF_FFFF);
    }

    #[test]
    fn test_token_from_row() {
        assert_eq!(Token::from_row(TableId::MethodDef, 5).value(), 0x0600_0005);
        assert_eq!(Token::from_row(TableId::TypeDef, 0x1_0001).value(), 0x0201_0001);
        assert_eq!(Token::from_row(TableId::Module, 1).value(), 0x0000_0001);
    }

    #[test]
    fn test_token_display() {
        let token = Token(0x0600_0001);
        assert_eq!(format!("{token}"), "0x06000001");
        assert_eq!(
            format!("{token:?}"),
            "Token(0x06000001, table: 0x06, row: 1)"
        );
    }
}
