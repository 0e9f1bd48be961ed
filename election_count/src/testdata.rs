//! Ballot sets shared by the unit tests.

use crate::choice::{Choice, ChoiceRegistry};

fn repeat(ballot: &[&Choice], times: usize) -> Vec<Vec<Choice>> {
    let b: Vec<Choice> = ballot.iter().map(|c| (*c).clone()).collect();
    vec![b; times]
}

/// The capital of Tennessee example of
/// https://en.wikipedia.org/wiki/Instant-runoff_voting
pub struct Tennessee {
    pub memphis: Choice,
    pub nashville: Choice,
    pub chattanooga: Choice,
    pub knoxville: Choice,
}

impl Tennessee {
    pub fn new() -> Tennessee {
        let mut reg = ChoiceRegistry::new();
        Tennessee {
            memphis: reg.create("Memphis"),
            nashville: reg.create("Nashville"),
            chattanooga: reg.create("Chattanooga"),
            knoxville: reg.create("Knoxville"),
        }
    }

    pub fn all(&self) -> Vec<Choice> {
        vec![
            self.memphis.clone(),
            self.nashville.clone(),
            self.chattanooga.clone(),
            self.knoxville.clone(),
        ]
    }

    /// First choices only.
    pub fn fptp_100(&self) -> Vec<Vec<Choice>> {
        let mut res = repeat(&[&self.memphis], 42);
        res.extend(repeat(&[&self.nashville], 26));
        res.extend(repeat(&[&self.chattanooga], 15));
        res.extend(repeat(&[&self.knoxville], 17));
        res
    }

    /// Full rankings.
    pub fn irv_100(&self) -> Vec<Vec<Choice>> {
        let (m, n, c, k) = (
            &self.memphis,
            &self.nashville,
            &self.chattanooga,
            &self.knoxville,
        );
        let mut res = repeat(&[m, n, c, k], 42);
        res.extend(repeat(&[n, c, k, m], 26));
        res.extend(repeat(&[c, k, n, m], 15));
        res.extend(repeat(&[k, c, n, m], 17));
        res
    }
}

pub struct Abcd {
    pub a: Choice,
    pub b: Choice,
    pub c: Choice,
    pub d: Choice,
}

impl Abcd {
    pub fn new(labels: [&str; 4]) -> Abcd {
        let mut reg = ChoiceRegistry::new();
        Abcd {
            a: reg.create(labels[0]),
            b: reg.create(labels[1]),
            c: reg.create(labels[2]),
            d: reg.create(labels[3]),
        }
    }

    /// Andrew, Brian, Catherine, David.
    pub fn andrew() -> Abcd {
        Abcd::new(["Andrew", "Brian", "Catherine", "David"])
    }

    /// Andrea, Brad, Carter, Delilah.
    pub fn andrea() -> Abcd {
        Abcd::new(["Andrea", "Brad", "Carter", "Delilah"])
    }

    /// Supplementary vote: two preferences per ballot.
    pub fn cv_2(&self) -> Vec<Vec<Choice>> {
        let (a, b, c) = (&self.a, &self.b, &self.c);
        let mut res = repeat(&[a, b], 30);
        res.extend(repeat(&[a, c], 6));
        res.extend(repeat(&[b, a], 9));
        res.extend(repeat(&[b, c], 7));
        res.extend(repeat(&[c, b], 28));
        res.extend(repeat(&[c, a], 20));
        res
    }

    /// Sri Lankan contingent vote: three preferences per ballot.
    pub fn cv_3(&self) -> Vec<Vec<Choice>> {
        let (a, b, c, d) = (&self.a, &self.b, &self.c, &self.d);
        let mut res = repeat(&[a, b, c], 34);
        res.extend(repeat(&[b, c, a], 17));
        res.extend(repeat(&[c, b, a], 22));
        res.extend(repeat(&[c, d, b], 10));
        res.extend(repeat(&[d, c, b], 37));
        res
    }

    /// Full rankings, used for Borda.
    pub fn cv_4(&self) -> Vec<Vec<Choice>> {
        let (a, b, c, d) = (&self.a, &self.b, &self.c, &self.d);
        let mut res = repeat(&[a, c, b, d], 51);
        res.extend(repeat(&[c, b, d, a], 5));
        res.extend(repeat(&[b, c, d, a], 23));
        res.extend(repeat(&[d, c, b, a], 21));
        res
    }
}

/// The party food example of
/// https://en.wikipedia.org/wiki/Single_transferable_vote
pub struct Food {
    pub oranges: Choice,
    pub pears: Choice,
    pub chocolate: Choice,
    pub strawberries: Choice,
    pub bonbons: Choice,
    pub hamburgers: Choice,
}

impl Food {
    pub fn new() -> Food {
        let mut reg = ChoiceRegistry::new();
        Food {
            oranges: reg.create("Oranges"),
            pears: reg.create("Pears"),
            chocolate: reg.create("Chocolate"),
            strawberries: reg.create("Strawberries"),
            bonbons: reg.create("Bonbons"),
            hamburgers: reg.create("Hamburgers"),
        }
    }

    pub fn stv_20(&self) -> Vec<Vec<Choice>> {
        let mut res = repeat(&[&self.oranges], 4);
        res.extend(repeat(&[&self.pears, &self.oranges], 2));
        res.extend(repeat(&[&self.chocolate, &self.strawberries], 8));
        res.extend(repeat(&[&self.chocolate, &self.bonbons], 4));
        res.extend(repeat(&[&self.strawberries], 1));
        res.extend(repeat(&[&self.hamburgers], 1));
        res
    }
}
