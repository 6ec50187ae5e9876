use serde::{Deserialize, Serialize};
use std::fmt;

/// Occupied orbitals of one spin channel.
///
/// Orbitals are stored sorted and without duplicates, so two `HalfDet`s with
/// the same occupation compare (and hash) equal regardless of how they were
/// built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HalfDet {
    orbs: Vec<u32>,
}

impl HalfDet {
    pub fn from_orbs<I: IntoIterator<Item = u32>>(orbs: I) -> Self {
        let mut orbs: Vec<u32> = orbs.into_iter().collect();
        orbs.sort_unstable();
        orbs.dedup();
        HalfDet { orbs }
    }

    pub fn orbs(&self) -> &[u32] {
        &self.orbs
    }

    pub fn n_elecs(&self) -> usize {
        self.orbs.len()
    }

    pub fn has(&self, orb: u32) -> bool {
        self.orbs.binary_search(&orb).is_ok()
    }

    /// Move one electron from `from` to `to`.
    ///
    /// Returns `None` when `from` is empty or `to` is already occupied.
    pub fn excite(&self, from: u32, to: u32) -> Option<HalfDet> {
        if !self.has(from) || self.has(to) {
            return None;
        }
        let mut orbs: Vec<u32> = self.orbs.iter().copied().filter(|&o| o != from).collect();
        let pos = orbs.binary_search(&to).unwrap_or_else(|p| p);
        orbs.insert(pos, to);
        Some(HalfDet { orbs })
    }

    /// Orbitals occupied only in `self` and only in `other`, in that order.
    pub fn diff(&self, other: &HalfDet) -> (Vec<u32>, Vec<u32>) {
        let mut left_only = Vec::new();
        let mut right_only = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.orbs.len() && j < other.orbs.len() {
            let (a, b) = (self.orbs[i], other.orbs[j]);
            if a == b {
                i += 1;
                j += 1;
            } else if a < b {
                left_only.push(a);
                i += 1;
            } else {
                right_only.push(b);
                j += 1;
            }
        }
        left_only.extend_from_slice(&self.orbs[i..]);
        right_only.extend_from_slice(&other.orbs[j..]);
        (left_only, right_only)
    }

    /// Number of electrons that have to move to turn `self` into `other`.
    pub fn n_diffs(&self, other: &HalfDet) -> usize {
        let (left_only, right_only) = self.diff(other);
        left_only.len().max(right_only.len())
    }

    /// Number of occupied orbitals strictly between `a` and `b`.
    pub fn n_occupied_between(&self, a: u32, b: u32) -> usize {
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        self.orbs.iter().filter(|&&o| o > lo && o < hi).count()
    }
}

impl fmt::Display for HalfDet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, orb) in self.orbs.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", orb)?;
        }
        write!(f, "]")
    }
}

/// One basis configuration: an up and a down occupation pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Det {
    pub up: HalfDet,
    pub dn: HalfDet,
}

impl Det {
    pub fn new(up: HalfDet, dn: HalfDet) -> Self {
        Det { up, dn }
    }

    pub fn from_orbs<I, J>(up: I, dn: J) -> Self
    where
        I: IntoIterator<Item = u32>,
        J: IntoIterator<Item = u32>,
    {
        Det {
            up: HalfDet::from_orbs(up),
            dn: HalfDet::from_orbs(dn),
        }
    }

    pub fn n_up(&self) -> usize {
        self.up.n_elecs()
    }

    pub fn n_dn(&self) -> usize {
        self.dn.n_elecs()
    }

    /// Excitation order between two determinants (0 for identical ones).
    pub fn n_excite(&self, other: &Det) -> u32 {
        (self.up.n_diffs(&other.up) + self.dn.n_diffs(&other.dn)) as u32
    }
}

impl fmt::Display for Det {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "up{} dn{}", self.up, self.dn)
    }
}
