use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::fmt::{Debug, Display};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// The identity of a choice. Allocated sequentially by a [ChoiceRegistry], so
/// the order of registration is also the order used to break ties.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct ChoiceId(pub u32);

/// A choice that can appear on a ballot.
///
/// Two choices are the same choice only if they share the same identity. The
/// label is for display: two write-ins spelled the same way but created
/// separately are distinct choices.
#[derive(Clone)]
pub struct Choice {
    id: ChoiceId,
    label: Arc<str>,
}

impl Choice {
    pub fn id(&self) -> ChoiceId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl PartialEq for Choice {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Choice {}

impl Hash for Choice {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Choice {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Choice {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Display for Choice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

impl Debug for Choice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Choice({}:{})", self.id.0, self.label)
    }
}

/// Hands out choice identities.
///
/// One registry is expected per question, so that identities (and therefore
/// tie-breaks) are reproducible from one run to the next.
#[derive(Debug, Default)]
pub struct ChoiceRegistry {
    next_id: u32,
    by_label: HashMap<String, Choice>,
}

impl ChoiceRegistry {
    pub fn new() -> ChoiceRegistry {
        ChoiceRegistry::default()
    }

    /// Creates a brand new choice, even if another one already carries the same label.
    pub fn create(&mut self, label: &str) -> Choice {
        let choice = Choice {
            id: ChoiceId(self.next_id),
            label: Arc::from(label),
        };
        self.next_id += 1;
        // The first choice registered under a label stays the one returned by intern().
        self.by_label
            .entry(label.to_string())
            .or_insert_with(|| choice.clone());
        choice
    }

    /// Returns the choice registered under this label, creating it if needed.
    pub fn intern(&mut self, label: &str) -> Choice {
        if let Some(c) = self.by_label.get(label) {
            return c.clone();
        }
        self.create(label)
    }

    pub fn lookup(&self, label: &str) -> Option<&Choice> {
        self.by_label.get(label)
    }

    /// Builds a field with one fresh choice per label, in order.
    pub fn field(&mut self, labels: &[&str]) -> Field {
        Field::new(labels.iter().map(|l| self.create(l)))
    }
}

/// The set of legal choices for a question.
///
/// An absent field (`None` wherever an `Option<&Field>` is expected) means
/// write-ins are permitted and membership is not checked.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Field {
    choices: BTreeSet<Choice>,
}

impl Field {
    pub fn new(choices: impl IntoIterator<Item = Choice>) -> Field {
        Field {
            choices: choices.into_iter().collect(),
        }
    }

    pub fn contains(&self, choice: &Choice) -> bool {
        self.choices.contains(choice)
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// The choices, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Choice> {
        self.choices.iter()
    }
}
