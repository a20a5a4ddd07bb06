/// Number of dash map shards for the given parallelism: the power of two
/// closest from below to `parallelism^2 / 4`, never less than 2.
/// Parallelism is capped at 192 so the shard count stays bounded.
pub fn shard_amount_for(parallelism: usize) -> usize {
    let parallelism = parallelism.clamp(2, 192);
    let optimal = parallelism * parallelism / 4;
    let shards = if optimal < 2 {
        2
    } else {
        1usize << optimal.ilog2()
    };
    debug!(
        "Parallelism: {}, optimal shards: {}, shards: {}",
        parallelism, optimal, shards
    );
    shards.max(2)
}

pub fn default_shard_amount() -> usize {
    let parallelism = std::thread::available_parallelism().map_or(1, usize::from);
    shard_amount_for(parallelism)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(3)]
    #[test_case(7)]
    #[test_case(21)]
    #[test_case(127)]
    #[test_case(8192)]
    #[test_case(usize::MAX)]
    fn shard_amount_is_power_of_two(parallelism: usize) {
        assert!(shard_amount_for(parallelism).is_power_of_two());
    }

    #[test]
    fn shard_amount_has_lower_bound() {
        assert_eq!(shard_amount_for(0), 2);
        assert_eq!(shard_amount_for(1), 2);
        assert_eq!(shard_amount_for(2), 2);
    }

    #[test]
    fn shard_amount_has_upper_bound() {
        assert_eq!(shard_amount_for(192), shard_amount_for(usize::MAX));
        assert_eq!(shard_amount_for(192), 8192);
    }

    #[test]
    fn default_shard_amount_is_usable() {
        assert!(default_shard_amount() >= 2);
    }
}
