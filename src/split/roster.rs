//! The `Roster` module collects incoming contribution rows into independent expense groups.
use std::collections::HashMap;

use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::split::{Individual, SplitConfig, SplitResult, ValidationError, settle};

/// A single input row: one individual's contribution to one group.
#[derive(Deserialize, Debug, Clone)]
pub struct Entry {
    /// The group label; rows without one share the unnamed group.
    #[serde(default)]
    group: Option<String>,

    /// The individual's name.
    name: String,

    /// Contribution in minor units.
    #[serde(default)]
    amount_units: Option<f64>,

    /// Contribution in major units.
    #[serde(default)]
    amount_spent: Option<f64>,
}

impl Entry {
    /// Splits the row into its group label and the individual it describes.
    pub fn into_parts(self) -> (String, Individual) {
        let group = self.group.unwrap_or_default();
        let individual = Individual::new(self.name, self.amount_units, self.amount_spent);
        (group, individual)
    }

    #[cfg(test)]
    pub fn new(
        group: Option<&str>,
        name: &str,
        amount_units: Option<f64>,
        amount_spent: Option<f64>,
    ) -> Self {
        Entry {
            group: group.map(str::to_string),
            name: name.to_string(),
            amount_units,
            amount_spent,
        }
    }
}

/// The individuals of one expense pool, in arrival order.
#[derive(Debug)]
pub struct Group {
    label: String,
    individuals: Vec<Individual>,
}

impl Group {
    /// Gets the group label. The unnamed group has an empty label.
    pub fn get_label(&self) -> &str {
        &self.label
    }

    /// Gets the individuals in arrival order.
    pub fn get_individuals(&self) -> &[Individual] {
        &self.individuals
    }
}

/// Collects entries from a channel and groups them by label.
pub struct Roster {
    /// Groups in the order their label first appeared.
    groups: Vec<Group>,
    /// Label to position in `groups`.
    index: HashMap<String, usize>,
    /// A channel receiver for incoming entries.
    receiver: mpsc::Receiver<Entry>,
}

impl Roster {
    /// Creates a new instance of `Roster` with no groups.
    pub fn new(receiver: mpsc::Receiver<Entry>) -> Self {
        Roster {
            groups: Vec::new(),
            index: HashMap::new(),
            receiver,
        }
    }

    /// Retrieves a group by label, or creates it if it doesn't exist.
    pub fn get_or_create_group(&mut self, label: &str) -> &mut Group {
        let position = match self.index.get(label).copied() {
            Some(position) => position,
            None => {
                debug!(group = label, "new group");
                self.groups.push(Group {
                    label: label.to_string(),
                    individuals: Vec::new(),
                });
                self.index.insert(label.to_string(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        &mut self.groups[position]
    }

    /// Retrieves all groups in first-seen order.
    #[cfg(test)]
    pub fn get_groups(&self) -> &[Group] {
        &self.groups
    }

    fn add_entry(&mut self, entry: Entry) {
        let (label, individual) = entry.into_parts();
        self.get_or_create_group(label.trim())
            .individuals
            .push(individual);
    }

    /// Runs the collection loop until every sender has been dropped.
    pub async fn run(&mut self) {
        while let Some(entry) = self.receiver.recv().await {
            self.add_entry(entry);
        }
        if self.groups.is_empty() {
            warn!("No entries received");
        }
    }

    /// Settles every group independently. A failing group does not affect the others.
    pub fn settle_all(
        &self,
        config: &SplitConfig,
    ) -> Vec<(&str, Result<SplitResult, ValidationError>)> {
        self.groups
            .iter()
            .map(|group| (group.get_label(), settle(config, group.get_individuals())))
            .collect()
    }
}
