use crate::drivers::ScopeError;
/// One `a0,a1` reading straight off the wire, before calibration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawSamplePair {
    pub a0_raw: i32,
    pub a1_raw: i32,
}
pub const DELIMITER: char = ',';
/// Parses a single `"<int>,<int>"` line. The whole line is rejected on any
/// error; nothing is ever returned for half a line.
pub fn parse_line(line: &str) -> Result<RawSamplePair, ScopeError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(ScopeError::malformed(line, "empty line"));
    }
    let mut tokens = trimmed.split(DELIMITER);
    let (Some(first), Some(second), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        let found = trimmed.matches(DELIMITER).count();
        return Err(ScopeError::malformed(
            line,
            format!("expected exactly one '{DELIMITER}', found {found}"),
        ));
    };
    Ok(RawSamplePair {
        a0_raw: parse_token(line, first)?,
        a1_raw: parse_token(line, second)?,
    })
}
fn parse_token(line: &str, token: &str) -> Result<i32, ScopeError> {
    token
        .trim()
        .parse::<i32>()
        .map_err(|e| ScopeError::malformed(line, format!("{token:?} is not an integer ({e})")))
}
