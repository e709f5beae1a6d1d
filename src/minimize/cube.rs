//! Cubes (products of literals) over up to 64 variables.

use std::collections::HashMap;

/// A product term. Bit `i` of `care` is set when variable `i` appears;
/// the same bit of `value` is its polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cube {
    pub care: u64,
    pub value: u64,
}

impl Cube {
    /// The empty product, true everywhere.
    pub const UNIVERSE: Cube = Cube { care: 0, value: 0 };

    pub fn literal(var: usize, positive: bool) -> Self {
        let bit = 1u64 << var;
        Cube {
            care: bit,
            value: if positive { bit } else { 0 },
        }
    }

    pub fn minterm(value: u64, full: u64) -> Self {
        Cube { care: full, value }
    }

    pub fn literals(&self) -> u32 {
        self.care.count_ones()
    }

    /// Whether every point of `other` lies in `self`.
    pub fn covers(&self, other: &Cube) -> bool {
        self.care & other.care == self.care && other.value & self.care == self.value
    }

    pub fn contains_minterm(&self, minterm: u64) -> bool {
        minterm & self.care == self.value
    }

    pub fn intersect(&self, other: &Cube) -> Option<Cube> {
        if self.care & other.care & (self.value ^ other.value) != 0 {
            return None;
        }
        Some(Cube {
            care: self.care | other.care,
            value: self.value | other.value,
        })
    }

    /// Drop the variables in `bits`.
    pub fn without(&self, bits: u64) -> Cube {
        Cube {
            care: self.care & !bits,
            value: self.value & !bits,
        }
    }

    /// Literals as (variable, positive) pairs in variable order.
    pub fn literal_list(&self) -> Vec<(usize, bool)> {
        let mut out = Vec::with_capacity(self.literals() as usize);
        let mut bits = self.care;
        while bits != 0 {
            let var = bits.trailing_zeros() as usize;
            out.push((var, (self.value >> var) & 1 == 1));
            bits &= bits - 1;
        }
        out
    }
}

/// Remove duplicate cubes and cubes covered by another cube.
pub fn absorb(mut cubes: Vec<Cube>) -> Vec<Cube> {
    cubes.sort_by_key(|c| (c.literals(), *c));
    cubes.dedup();
    let mut kept: Vec<Cube> = Vec::with_capacity(cubes.len());
    for cube in cubes {
        if !kept.iter().any(|k| k.covers(&cube)) {
            kept.push(cube);
        }
    }
    kept
}

/// Restrict a cover to the subspace of `by`.
pub fn cofactor(cubes: &[Cube], by: Cube) -> Vec<Cube> {
    cubes
        .iter()
        .filter(|c| c.care & by.care & (c.value ^ by.value) == 0)
        .map(|c| c.without(by.care))
        .collect()
}

/// Unate-recursive tautology check.
pub fn is_tautology(cubes: &[Cube]) -> bool {
    if cubes.iter().any(|c| c.care == 0) {
        return true;
    }
    if cubes.is_empty() {
        return false;
    }

    let mut positive = 0u64;
    let mut negative = 0u64;
    for c in cubes {
        positive |= c.care & c.value;
        negative |= c.care & !c.value;
    }
    let binate = positive & negative;
    // A unate cover is a tautology only if it holds the universe.
    if binate == 0 {
        return false;
    }

    let bit = most_frequent(binate, cubes);
    is_tautology(&cofactor(cubes, Cube { care: bit, value: bit }))
        && is_tautology(&cofactor(cubes, Cube { care: bit, value: 0 }))
}

/// Whether `cube` is implied by the cover.
pub fn cover_contains(cubes: &[Cube], cube: Cube) -> bool {
    is_tautology(&cofactor(cubes, cube))
}

fn most_frequent(bits: u64, cubes: &[Cube]) -> u64 {
    let mut counts: HashMap<u64, usize> = HashMap::new();
    for c in cubes {
        let mut remaining = c.care & bits;
        while remaining != 0 {
            let bit = remaining & remaining.wrapping_neg();
            *counts.entry(bit).or_default() += 1;
            remaining &= remaining - 1;
        }
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        .map(|(bit, _)| bit)
        .unwrap_or(bits & bits.wrapping_neg())
}
