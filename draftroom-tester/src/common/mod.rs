use sha2::{Digest, Sha256};

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Hex SHA-256 over a run's per-iteration digests, in order.
pub fn run_fingerprint(digests: &[u64]) -> String {
    let mut hasher = Sha256::new();
    for digest in digests {
        hasher.update(digest.to_le_bytes());
    }
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_trims_and_filters() {
        let parts = split_csv(" alpha, ,beta,  gamma ");
        assert_eq!(parts, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn fingerprint_is_order_sensitive() {
        let a = run_fingerprint(&[1, 2, 3]);
        assert_eq!(a.len(), 64);
        assert_eq!(a, run_fingerprint(&[1, 2, 3]));
        assert_ne!(a, run_fingerprint(&[3, 2, 1]));
    }
}
