use rand::Rng;

pub const DEFAULT_ID_PREFIX: &str = "liquid-fill-";

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const RANDOM_ID_LEN: usize = 9;

/// Produces the identifier that namespaces a gauge's clip and gradient regions.
pub trait IdProvider {
    fn generate(&self, prefix: &str, seed: Option<&str>) -> String;
}

/// Random base-36 ids for interactive use, where several gauges share a window.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdProvider for RandomIds {
    fn generate(&self, prefix: &str, _seed: Option<&str>) -> String {
        let mut rng = rand::rng();
        let suffix: String = (0..RANDOM_ID_LEN)
            .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
            .collect();
        format!("{prefix}{suffix}")
    }
}

/// Stable ids derived from the seed, for non-interactive rendering and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeterministicIds;

impl IdProvider for DeterministicIds {
    fn generate(&self, prefix: &str, seed: Option<&str>) -> String {
        format!("{prefix}{}", seed.unwrap_or("server"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_ids_use_seed() {
        let ids = DeterministicIds;
        assert_eq!(ids.generate(DEFAULT_ID_PREFIX, Some("70")), "liquid-fill-70");
        assert_eq!(ids.generate(DEFAULT_ID_PREFIX, None), "liquid-fill-server");
    }

    #[test]
    fn test_random_ids_are_base36() {
        let id = RandomIds.generate(DEFAULT_ID_PREFIX, Some("ignored"));
        let suffix = id.strip_prefix(DEFAULT_ID_PREFIX).unwrap_or_default();
        assert_eq!(suffix.len(), RANDOM_ID_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }
}
