//! Named protocol upgrades of the chain.

use strum::{Display, EnumIter};

/// A block-activated protocol upgrade.
///
/// Variants are declared in activation order. Iterating with
/// [`strum::IntoEnumIterator`] therefore walks the upgrades oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
pub enum Hardfork {
    /// Homestead.
    #[strum(to_string = "Homestead")]
    Homestead,
    /// The DAO hard fork.
    #[strum(to_string = "DAO")]
    Dao,
    /// EIP-150 gas repricing.
    #[strum(to_string = "EIP150")]
    Eip150,
    /// EIP-155 replay protection.
    #[strum(to_string = "EIP155")]
    Eip155,
    /// EIP-158 state clearing.
    #[strum(to_string = "EIP158")]
    Eip158,
    /// Byzantium.
    #[strum(to_string = "Byzantium")]
    Byzantium,
    /// Constantinople.
    #[strum(to_string = "Constantinople")]
    Constantinople,
    /// eWASM.
    #[strum(to_string = "ewasm")]
    Ewasm,
}

/// Returns whether a fork scheduled at `activation` is active at block `number`.
///
/// An unscheduled fork is never active.
pub const fn is_forked(activation: Option<u64>, number: u64) -> bool {
    match activation {
        Some(block) => block <= number,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_is_forked() {
        assert!(!is_forked(None, 0));
        assert!(!is_forked(None, u64::MAX));
        assert!(is_forked(Some(0), 0));
        assert!(is_forked(Some(10), 10));
        assert!(is_forked(Some(10), 11));
        assert!(!is_forked(Some(10), 9));
    }

    #[test]
    fn test_hardfork_iteration_order() {
        let forks: Vec<_> = Hardfork::iter().collect();
        assert_eq!(forks.first(), Some(&Hardfork::Homestead));
        assert_eq!(forks.last(), Some(&Hardfork::Ewasm));
        assert!(forks.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_hardfork_display() {
        assert_eq!(Hardfork::Dao.to_string(), "DAO");
        assert_eq!(Hardfork::Eip158.to_string(), "EIP158");
        assert_eq!(Hardfork::Ewasm.to_string(), "ewasm");
    }
}
