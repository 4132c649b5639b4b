use thiserror::Error;

/// Seeds used when `all` is requested.
pub const STANDARD_SEEDS: [u64; 6] = [1, 7, 42, 1337, 0x00C0_FFEE, 0xDEAD_BEEF];
const FALLBACK_SEED: u64 = 1337;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeedError {
    #[error("unrecognized seed token: {0}")]
    Unrecognized(String),
}

/// Resolve CLI seed tokens into a deduplicated, ordered seed list.
///
/// Accepts decimal integers (negative values use their magnitude), `0x` hex
/// literals, and `all`, which expands to [`STANDARD_SEEDS`].
///
/// # Errors
///
/// Returns `SeedError::Unrecognized` for anything else.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>, SeedError> {
    let mut seeds: Vec<u64> = Vec::new();
    let mut push = |seed: u64| {
        if !seeds.contains(&seed) {
            seeds.push(seed);
        }
    };

    for token in tokens {
        if token.is_empty() {
            continue;
        }
        if token.eq_ignore_ascii_case("all") {
            STANDARD_SEEDS.into_iter().for_each(&mut push);
            continue;
        }
        if let Some(hex) = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
        {
            let value = u64::from_str_radix(&hex.replace('_', ""), 16)
                .map_err(|_| SeedError::Unrecognized(token.clone()))?;
            push(value);
            continue;
        }
        if let Ok(value) = token.parse::<u64>() {
            push(value);
            continue;
        }
        if let Ok(value) = token.parse::<i64>() {
            push(value.unsigned_abs());
            continue;
        }
        return Err(SeedError::Unrecognized(token.clone()));
    }

    if seeds.is_empty() {
        seeds.push(FALLBACK_SEED);
    }
    Ok(seeds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn resolves_numeric_hex_and_negative() {
        let seeds = resolve_seed_inputs(&tokens(&["42", "-7", "0xC0_FFEE", "42"])).unwrap();
        assert_eq!(seeds, vec![42, 7, 0x00C0_FFEE]);
    }

    #[test]
    fn expands_all_and_defaults_when_empty() {
        let seeds = resolve_seed_inputs(&tokens(&["all", "1"])).unwrap();
        assert_eq!(seeds, STANDARD_SEEDS.to_vec());
        assert_eq!(resolve_seed_inputs(&[]).unwrap(), vec![FALLBACK_SEED]);
    }

    #[test]
    fn rejects_words() {
        assert_eq!(
            resolve_seed_inputs(&tokens(&["orange"])),
            Err(SeedError::Unrecognized("orange".into()))
        );
    }
}
