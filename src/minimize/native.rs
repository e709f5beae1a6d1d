//! In-process two-level minimization.
//!
//! Small formulas are minimized exactly from their truth table
//! (Quine-McCluskey prime implicants, essential primes, then a greedy
//! cover). Larger ones are expanded to a cube list and reduced with
//! Espresso-style EXPAND and IRREDUNDANT passes. Formulas over more than
//! [`MAX_VARIABLES`] variables, or whose cube list outgrows the configured
//! limit, are returned [`Minimized::Unminimized`].

use std::collections::{BTreeSet, HashMap, HashSet};

use super::cube::{Cube, absorb, cover_contains, is_tautology};
use super::{Minimized, Minimizer};
use crate::boolean::{BoolExpr, parse_formula};
use crate::error::{OptimizeError, Result};

/// Truth tables are never enumerated past this many variables.
pub const MAX_EXACT_VARIABLES: usize = 20;
pub const MAX_VARIABLES: usize = 64;

#[derive(Debug, Clone)]
pub struct NativeMinimizer {
    exact_variable_limit: usize,
    max_cubes: usize,
}

impl Default for NativeMinimizer {
    fn default() -> Self {
        Self {
            exact_variable_limit: 12,
            max_cubes: 4096,
        }
    }
}

impl NativeMinimizer {
    pub fn new(exact_variable_limit: usize, max_cubes: usize) -> Self {
        Self {
            exact_variable_limit: exact_variable_limit.min(MAX_EXACT_VARIABLES),
            max_cubes: max_cubes.max(1),
        }
    }
}

impl Minimizer for NativeMinimizer {
    fn name(&self) -> &'static str {
        "native"
    }

    fn minimize(&self, formula: &str) -> Result<Minimized> {
        let expr = parse_formula(formula)?;
        let names: Vec<String> = expr.variables().into_iter().map(String::from).collect();
        if names.len() > MAX_VARIABLES {
            tracing::warn!(
                "Formula has {} variables, more than {}; skipping minimization",
                names.len(),
                MAX_VARIABLES
            );
            return Ok(Minimized::Unminimized);
        }
        let index: HashMap<&str, usize> = names
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.as_str(), idx))
            .collect();

        let cover = if names.len() <= self.exact_variable_limit {
            tracing::debug!("Exact minimization over {} variables", names.len());
            exact_cover(&expr, &index, names.len())
        } else {
            tracing::debug!("Heuristic minimization over {} variables", names.len());
            let Some(cover) = heuristic_cover(&expr, &index, self.max_cubes)? else {
                tracing::warn!(
                    "Cube list over {} variables exceeds {} cubes; skipping minimization",
                    names.len(),
                    self.max_cubes
                );
                return Ok(Minimized::Unminimized);
            };
            cover
        };

        Ok(match cover {
            Cover::Contradiction => Minimized::Contradiction,
            Cover::Tautology => Minimized::Tautology,
            Cover::Cubes(cubes) => Minimized::Expression(format_dnf(cubes, &names)),
        })
    }
}

enum Cover {
    Contradiction,
    Tautology,
    Cubes(Vec<Cube>),
}

fn full_mask(vars: usize) -> u64 {
    if vars >= 64 { u64::MAX } else { (1u64 << vars) - 1 }
}

fn exact_cover(expr: &BoolExpr, index: &HashMap<&str, usize>, vars: usize) -> Cover {
    let ones: Vec<u64> = (0..1u64 << vars)
        .filter(|&m| {
            expr.evaluate(&|name: &str| index.get(name).is_some_and(|&i| (m >> i) & 1 == 1))
        })
        .collect();

    if ones.is_empty() {
        return Cover::Contradiction;
    }
    if ones.len() as u64 == 1u64 << vars {
        return Cover::Tautology;
    }

    let primes = prime_implicants(&ones, full_mask(vars));
    Cover::Cubes(select_cover(&primes, &ones))
}

/// Quine-McCluskey: merge cubes differing in one variable until nothing merges.
fn prime_implicants(ones: &[u64], full: u64) -> Vec<Cube> {
    let mut level: BTreeSet<Cube> = ones.iter().map(|&m| Cube::minterm(m, full)).collect();
    let mut primes = Vec::new();

    while !level.is_empty() {
        let mut next = BTreeSet::new();
        let mut merged = HashSet::new();
        for cube in &level {
            let mut bits = cube.care;
            while bits != 0 {
                let bit = bits & bits.wrapping_neg();
                bits &= bits - 1;
                let partner = Cube {
                    care: cube.care,
                    value: cube.value ^ bit,
                };
                if level.contains(&partner) {
                    merged.insert(*cube);
                    next.insert(cube.without(bit));
                }
            }
        }
        primes.extend(level.iter().filter(|c| !merged.contains(*c)).copied());
        level = next;
    }

    primes
}

fn select_cover(primes: &[Cube], ones: &[u64]) -> Vec<Cube> {
    let mut chosen: Vec<Cube> = Vec::new();

    for &m in ones {
        let mut covering = primes.iter().filter(|p| p.contains_minterm(m));
        if let (Some(only), None) = (covering.next(), covering.next())
            && !chosen.contains(only)
        {
            chosen.push(*only);
        }
    }

    let mut uncovered: BTreeSet<u64> = ones
        .iter()
        .copied()
        .filter(|&m| !chosen.iter().any(|p| p.contains_minterm(m)))
        .collect();

    while !uncovered.is_empty() {
        let gain = |p: &Cube| uncovered.iter().filter(|&&m| p.contains_minterm(m)).count();
        let best = primes
            .iter()
            .filter(|p| !chosen.contains(*p))
            .map(|p| (gain(p), p))
            .filter(|(covered, _)| *covered > 0)
            .max_by(|(ga, a), (gb, b)| {
                ga.cmp(gb)
                    .then(b.literals().cmp(&a.literals()))
                    .then(b.cmp(a))
            })
            .map(|(_, p)| *p);
        let Some(best) = best else {
            break;
        };
        uncovered.retain(|&m| !best.contains_minterm(m));
        chosen.push(best);
    }

    // Greedy picks can make earlier choices redundant.
    let mut idx = chosen.len();
    while idx > 0 {
        idx -= 1;
        let candidate = chosen[idx];
        let redundant = ones
            .iter()
            .filter(|&&m| candidate.contains_minterm(m))
            .all(|&m| {
                chosen
                    .iter()
                    .enumerate()
                    .any(|(other, p)| other != idx && p.contains_minterm(m))
            });
        if redundant {
            chosen.remove(idx);
        }
    }

    chosen
}

fn heuristic_cover(
    expr: &BoolExpr,
    index: &HashMap<&str, usize>,
    max_cubes: usize,
) -> Result<Option<Cover>> {
    let Some(onset) = to_cubes(expr, true, index, max_cubes)? else {
        return Ok(None);
    };
    if onset.is_empty() {
        return Ok(Some(Cover::Contradiction));
    }
    if is_tautology(&onset) {
        return Ok(Some(Cover::Tautology));
    }

    let expanded = absorb(
        onset
            .iter()
            .map(|&cube| expand(cube, &onset))
            .collect(),
    );
    Ok(Some(Cover::Cubes(irredundant(expanded))))
}

/// Build the cube list of `expr` (or of its negation when `positive` is false).
///
/// `None` once the list grows past `max_cubes`.
fn to_cubes(
    expr: &BoolExpr,
    positive: bool,
    index: &HashMap<&str, usize>,
    max_cubes: usize,
) -> Result<Option<Vec<Cube>>> {
    let cubes = match expr {
        BoolExpr::Var(name) => {
            let var = index.get(name.as_str()).copied().ok_or_else(|| {
                OptimizeError::MinimizerFailure(format!("unindexed variable {}", name))
            })?;
            vec![Cube::literal(var, positive)]
        }
        BoolExpr::Not(inner) => return to_cubes(inner, !positive, index, max_cubes),
        BoolExpr::And(items) | BoolExpr::Or(items) => {
            let product = matches!(expr, BoolExpr::And(_)) == positive;
            if product {
                let mut acc = vec![Cube::UNIVERSE];
                for item in items {
                    let Some(factor) = to_cubes(item, positive, index, max_cubes)? else {
                        return Ok(None);
                    };
                    let crossed = acc
                        .iter()
                        .flat_map(|a| factor.iter().filter_map(move |b| a.intersect(b)))
                        .collect();
                    acc = absorb(crossed);
                    if acc.len() > max_cubes {
                        return Ok(None);
                    }
                }
                acc
            } else {
                let mut acc = Vec::new();
                for item in items {
                    let Some(cubes) = to_cubes(item, positive, index, max_cubes)? else {
                        return Ok(None);
                    };
                    acc.extend(cubes);
                }
                absorb(acc)
            }
        }
    };
    Ok((cubes.len() <= max_cubes).then_some(cubes))
}

/// Drop literals while the cube stays inside the function.
fn expand(mut cube: Cube, onset: &[Cube]) -> Cube {
    let mut bits = cube.care;
    while bits != 0 {
        let bit = bits & bits.wrapping_neg();
        bits &= bits - 1;
        let candidate = cube.without(bit);
        if cover_contains(onset, candidate) {
            cube = candidate;
        }
    }
    cube
}

/// Remove cubes covered by the rest of the cover, most specific first.
fn irredundant(mut cubes: Vec<Cube>) -> Vec<Cube> {
    cubes.sort_by_key(|c| (std::cmp::Reverse(c.literals()), *c));
    let mut idx = 0;
    while idx < cubes.len() {
        let rest: Vec<Cube> = cubes
            .iter()
            .enumerate()
            .filter(|(other, _)| *other != idx)
            .map(|(_, c)| *c)
            .collect();
        if cover_contains(&rest, cubes[idx]) {
            cubes.remove(idx);
        } else {
            idx += 1;
        }
    }
    cubes
}

/// `Or(And(v1, Not(v2)), v3)` with terms ordered by size then literals.
fn format_dnf(mut cubes: Vec<Cube>, names: &[String]) -> String {
    cubes.sort_by_key(|c| {
        let key: Vec<(usize, bool)> = c
            .literal_list()
            .into_iter()
            .map(|(var, positive)| (var, !positive))
            .collect();
        (c.literals(), key)
    });

    let terms: Vec<BoolExpr> = cubes
        .iter()
        .map(|cube| {
            let mut literals: Vec<BoolExpr> = cube
                .literal_list()
                .into_iter()
                .map(|(var, positive)| {
                    let atom = BoolExpr::var(&names[var]);
                    if positive { atom } else { BoolExpr::negate(atom) }
                })
                .collect();
            if literals.len() == 1 {
                literals.remove(0)
            } else {
                BoolExpr::And(literals)
            }
        })
        .collect();

    match terms.len() {
        1 => terms[0].to_string(),
        _ => BoolExpr::Or(terms).to_string(),
    }
}
