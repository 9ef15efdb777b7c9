use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt::Write;

/// Number of random bytes mixed into every generated name.
const RANDOM_BYTES: usize = 32;

/// Represents a randomly generated file name.
pub(crate) struct RandomName {
    name: String,
}

impl RandomName {
    /// Builds `prefix + hex(random) + suffix` using the operating system's CSPRNG.
    pub fn new(prefix: &str, suffix: &str) -> Self {
        let mut bytes = [0u8; RANDOM_BYTES];
        OsRng.fill_bytes(&mut bytes);

        let mut name = String::with_capacity(prefix.len() + RANDOM_BYTES * 2 + suffix.len());
        name.push_str(prefix);
        for byte in bytes {
            // Writing into a String cannot fail.
            let _ = write!(name, "{:02x}", byte);
        }
        name.push_str(suffix);

        Self { name }
    }
}

impl AsRef<str> for RandomName {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_random_name() {
        let name = RandomName::new("test", ".bin");
        let name = name.as_ref();
        assert!(name.starts_with("test"));
        assert!(name.ends_with(".bin"));

        let random = &name["test".len()..name.len() - ".bin".len()];
        assert_eq!(random.len(), RANDOM_BYTES * 2);
        assert!(random.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_random_names_are_distinct() {
        let names: HashSet<String> = (0..10_000)
            .map(|_| RandomName::new("", "").as_ref().to_owned())
            .collect();
        assert_eq!(names.len(), 10_000);
    }
}
