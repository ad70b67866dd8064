use rand::Rng;

const HEX: &[u8; 16] = b"0123456789abcdef";

/// The 32-hex-digit recovery hash, split across two intranet pages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Secret {
    full: String,
}

impl Secret {
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let full = (0..32)
            .map(|_| HEX[rng.gen_range(0..HEX.len())] as char)
            .collect();
        Self { full }
    }

    /// Use a fixed hash instead of a random one.
    pub fn fixed(full: impl Into<String>) -> Self {
        Self { full: full.into() }
    }

    pub fn full(&self) -> &str {
        &self.full
    }

    pub fn first_half(&self) -> &str {
        let mid = self.midpoint();
        &self.full[..mid]
    }

    pub fn second_half(&self) -> &str {
        let mid = self.midpoint();
        &self.full[mid..]
    }

    fn midpoint(&self) -> usize {
        let mut mid = self.full.len() / 2;
        while !self.full.is_char_boundary(mid) {
            mid += 1;
        }
        mid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generated_hash_is_lowercase_hex() {
        let secret = Secret::generate(&mut StdRng::seed_from_u64(9));
        assert_eq!(secret.full().len(), 32);
        assert!(secret.full().bytes().all(|b| HEX.contains(&b)));
    }

    #[test]
    fn halves_recombine() {
        let secret = Secret::fixed("0123456789abcdeffedcba9876543210");
        assert_eq!(secret.first_half(), "0123456789abcdef");
        assert_eq!(secret.second_half(), "fedcba9876543210");
        assert_eq!(
            format!("{}{}", secret.first_half(), secret.second_half()),
            secret.full()
        );
    }
}
