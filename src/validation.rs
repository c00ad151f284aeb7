pub const MIN_AGE: i64 = 11;
pub const MAX_AGE: i64 = 14;

/// Parses a player's age as submitted by the form. The frontend sends a JSON
/// number, but older copies of the form sent the raw input string, so both
/// are accepted. Anything non-integral is rejected before the range check.
pub fn parse_age(
    age: Option<&serde_json::Value>,
    player_number: u8,
) -> Result<i64, String> {
    let age = match age {
        Some(serde_json::Value::Number(n)) => n.as_i64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| "Invalid age provided".to_string())?;

    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(format!(
            "Player {player_number} age must be between {MIN_AGE}-{MAX_AGE}"
        ));
    }

    Ok(age)
}
