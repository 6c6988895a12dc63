use anyhow::{Result, bail};
use regex::Regex;
use std::collections::BTreeSet;

/// Widest range a single token may expand to.
const MAX_RANGE_SPAN: u64 = 10_000;
const DEFAULT_SEED: u64 = 1337;

/// Resolve CLI seed tokens into a deduplicated, ordered seed list.
///
/// Supports literal integers (negative values use their magnitude) and
/// ranges written `a..b` (exclusive) or `a..=b` (inclusive).
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let range = Regex::new(r"^(\d+)\.\.(=?)(\d+)$")?;
    let mut seen = BTreeSet::new();
    let mut seeds = Vec::new();
    let mut push = |seed: u64| {
        if seen.insert(seed) {
            seeds.push(seed);
        }
    };

    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        if let Some(caps) = range.captures(token) {
            let start: u64 = caps[1].parse()?;
            let mut end: u64 = caps[3].parse()?;
            if &caps[2] == "=" {
                end = end.saturating_add(1);
            }
            if end <= start {
                bail!("Empty seed range: {token}");
            }
            if end - start > MAX_RANGE_SPAN {
                bail!("Seed range {token} spans more than {MAX_RANGE_SPAN} seeds");
            }
            (start..end).for_each(&mut push);
            continue;
        }

        if let Ok(value) = token.parse::<i64>() {
            push(value.unsigned_abs());
            continue;
        }

        if let Ok(value) = token.parse::<u64>() {
            push(value);
            continue;
        }

        bail!("Unrecognized seed token: {token}");
    }

    if seeds.is_empty() {
        seeds.push(DEFAULT_SEED);
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
    fn resolves_numbers_and_ranges() {
        let seeds = resolve_seed_inputs(&tokens(&["42", "-7", "3..6", "10..=11"])).unwrap();
        assert_eq!(seeds, vec![42, 7, 3, 4, 5, 10, 11]);
    }

    #[test]
    fn deduplicates_and_defaults() {
        let seeds = resolve_seed_inputs(&tokens(&["5", "4..7"])).unwrap();
        assert_eq!(seeds, vec![5, 4, 6]);
        assert_eq!(resolve_seed_inputs(&[]).unwrap(), vec![DEFAULT_SEED]);
    }

    #[test]
    fn rejects_bad_tokens() {
        assert!(resolve_seed_inputs(&tokens(&["banana"])).is_err());
        assert!(resolve_seed_inputs(&tokens(&["9..3"])).is_err());
        assert!(resolve_seed_inputs(&tokens(&["0..99999999"])).is_err());
    }
}
