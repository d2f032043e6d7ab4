//! Log-space combinatorics for likelihoods over small bags.

/// `ln(n choose k)`, or negative infinity when `k > n`.
#[must_use]
pub fn ln_binomial(n: u32, k: u32) -> f64 {
    if k > n {
        return f64::NEG_INFINITY;
    }
    let k = k.min(n - k);
    (1..=k)
        .map(|i| (f64::from(n - k + i) / f64::from(i)).ln())
        .sum()
}

/// Log-probability of seeing exactly `seen[i]` items of each category when
/// drawing `sum(seen)` items without replacement from a bag holding `counts`.
///
/// Returns negative infinity when the bag cannot produce the observation.
#[must_use]
pub fn ln_hypergeometric(counts: &[u32], seen: &[u32]) -> f64 {
    let total: u32 = counts.iter().sum();
    let drawn: u32 = seen.iter().sum();
    if drawn > total {
        return f64::NEG_INFINITY;
    }
    let mut log_like = -ln_binomial(total, drawn);
    for (&have, &want) in counts.iter().zip(seen) {
        if want > have {
            return f64::NEG_INFINITY;
        }
        log_like += ln_binomial(have, want);
    }
    log_like
}
