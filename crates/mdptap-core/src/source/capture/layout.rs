/// File extensions read as hex text captures (compared case-insensitively).
pub const HEX_EXTENSIONS: [&str; 2] = ["hex", "txt"];
/// Starts a comment that runs to the end of the line in hex captures.
pub const HEX_COMMENT: char = '#';
