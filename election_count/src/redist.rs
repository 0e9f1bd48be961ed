//! The order in which a transferable vote moves ballots around.
//!
//! A redistributor takes ownership of the ballots it orders and yields each of
//! them exactly once. Consuming it a second time is not possible.

use log::debug;
use rand::rngs::ThreadRng;
use rand::Rng;

use crate::config::*;

/// Every 11th ballot.
pub const CINCINNATI_STEP: usize = 11;

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// Visits every nth item, wrapping around, starting with the nth.
///
/// Index `k` of the output is item `(n - 1 + k * n) mod len` of the input.
/// This only visits every item once if `n` and the number of items are
/// relatively prime, which is checked when the order is built.
#[derive(Debug)]
pub struct NthSubset<T> {
    items: Vec<Option<T>>,
    n: usize,
    visited: usize,
}

impl<T> NthSubset<T> {
    pub fn new(n: usize, items: Vec<T>) -> Result<NthSubset<T>, ConfigurationError> {
        snafu::ensure!(n >= 2, TrivialSubsetSnafu { n });
        let len = items.len();
        snafu::ensure!(len == 0 || gcd(n, len) == 1, NotCoprimeSnafu { n, len });
        debug!("every {}th of {} items", n, len);
        Ok(NthSubset {
            items: items.into_iter().map(Some).collect(),
            n,
            visited: 0,
        })
    }
}

impl<T> Iterator for NthSubset<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let len = self.items.len();
        if self.visited >= len {
            return None;
        }
        let idx = (self.n - 1 + self.visited * self.n) % len;
        self.visited += 1;
        self.items[idx].take()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.items.len() - self.visited;
        (left, Some(left))
    }
}

/// Draws the items uniformly at random, without replacement.
#[derive(Debug)]
pub struct HareRandom<T, R = ThreadRng> {
    items: Vec<T>,
    rng: R,
}

impl<T> HareRandom<T, ThreadRng> {
    pub fn new(items: Vec<T>) -> HareRandom<T, ThreadRng> {
        HareRandom::with_rng(items, rand::thread_rng())
    }
}

impl<T, R: Rng> HareRandom<T, R> {
    /// With a given source of randomness, for example a seeded one so that the
    /// order can be reproduced.
    pub fn with_rng(items: Vec<T>, rng: R) -> HareRandom<T, R> {
        HareRandom { items, rng }
    }
}

impl<T, R: Rng> Iterator for HareRandom<T, R> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }
        let idx = self.rng.gen_range(0..self.items.len());
        Some(self.items.swap_remove(idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.items.len(), Some(self.items.len()))
    }
}

/// One of the supported orders, as selected by a [RedistributorKind].
#[derive(Debug)]
pub enum Redistributor<T> {
    Identity(std::vec::IntoIter<T>),
    NthSubset(NthSubset<T>),
    HareRandom(HareRandom<T>),
}

impl<T> Redistributor<T> {
    pub fn new(kind: RedistributorKind, items: Vec<T>) -> Result<Redistributor<T>, ConfigurationError> {
        kind.validate()?;
        let r = match kind {
            RedistributorKind::Identity => Redistributor::Identity(items.into_iter()),
            RedistributorKind::NthSubset(n) => Redistributor::NthSubset(NthSubset::new(n, items)?),
            RedistributorKind::Cincinnati => {
                Redistributor::NthSubset(NthSubset::new(CINCINNATI_STEP, items)?)
            }
            RedistributorKind::HareRandom => Redistributor::HareRandom(HareRandom::new(items)),
            RedistributorKind::Gregory
            | RedistributorKind::Wright
            | RedistributorKind::Meek
            | RedistributorKind::Warren => {
                return UnsupportedSnafu { name: kind.name() }.fail();
            }
        };
        Ok(r)
    }
}

impl<T> Iterator for Redistributor<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        match self {
            Redistributor::Identity(it) => it.next(),
            Redistributor::NthSubset(it) => it.next(),
            Redistributor::HareRandom(it) => it.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Redistributor::Identity(it) => it.size_hint(),
            Redistributor::NthSubset(it) => it.size_hint(),
            Redistributor::HareRandom(it) => it.size_hint(),
        }
    }
}
