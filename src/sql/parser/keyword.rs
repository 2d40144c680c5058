use strum::{Display, EnumString};

/// SQL keywords recognized by the lexer.
///
/// Matching is case-insensitive; a keyword always displays in upper case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Keyword {
    Select,
    From,
    Where,
    And,
    Or,
    Not,

    Insert,
    Into,
    Values,
    Update,
    Set,
    Delete,
    Returning,

    Create,
    Table,
    If,
    Exists,
    Drop,
}
