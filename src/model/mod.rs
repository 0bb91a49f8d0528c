//! Aggregation model: collect measurements into a market -> test -> action table.

use crate::testlog::Measurement;
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

/// A string-keyed map that keeps first-insertion order.
///
/// Tables here hold a handful of markets, tests and actions, so lookups are a
/// linear scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyed<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for Keyed<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> Keyed<V> {
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns the value at `key`, inserting `V::default()` at the end if absent.
    pub fn entry_or_default(&mut self, key: &str) -> &mut V
    where
        V: Default,
    {
        let idx = match self.entries.iter().position(|(k, _)| k == key) {
            Some(idx) => idx,
            None => {
                self.entries.push((key.to_string(), V::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    /// Insert or overwrite; an overwritten key keeps its original position.
    pub fn insert(&mut self, key: &str, value: V) -> Option<V> {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key.to_string(), value));
                None
            }
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Serialize> Serialize for Keyed<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

pub type ActionResults = Keyed<Measurement>;
pub type TestResults = Keyed<ActionResults>;

/// Which call path to keep when a benchmark reports both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CallMode {
    /// Keep only calls routed through an externally owned account.
    EoaOnly,
    /// Keep only direct contract calls.
    DirectOnly,
    #[default]
    Unfiltered,
}

impl CallMode {
    /// Whether a measurement survives the filter.
    ///
    /// Unmeasured rows (gas 0) always survive so their cells still show up.
    pub fn admits(self, m: &Measurement) -> bool {
        if m.gas_usage == 0 {
            return true;
        }
        match self {
            CallMode::EoaOnly => !m.is_direct_call,
            CallMode::DirectOnly => m.is_direct_call,
            CallMode::Unfiltered => true,
        }
    }
}

/// Min/max of the nonzero gas values observed for one (test, action) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasRange {
    pub min: u64,
    pub max: u64,
}

/// All measurements of one run, keyed market -> test -> action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultTable {
    markets: Keyed<TestResults>,
    /// Test names in the order they were first seen across all markets.
    test_order: Vec<String>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a measurement. A later measurement at the same key replaces the
    /// earlier one.
    pub fn insert(&mut self, m: Measurement) {
        if !self.test_order.iter().any(|t| t == &m.test_name) {
            self.test_order.push(m.test_name.clone());
        }
        let market = self.markets.entry_or_default(&m.market);
        let actions = market.entry_or_default(&m.test_name);
        let action_name = m.action_name.clone();
        actions.insert(&action_name, m);
    }

    pub fn markets(&self) -> impl Iterator<Item = &str> {
        self.markets.keys()
    }

    pub fn market_count(&self) -> usize {
        self.markets.len()
    }

    pub fn test_names(&self) -> &[String] {
        &self.test_order
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty() || self.test_order.is_empty()
    }

    pub fn actions(&self, market: &str, test: &str) -> Option<&ActionResults> {
        self.markets.get(market)?.get(test)
    }

    pub fn get(&self, market: &str, test: &str, action: &str) -> Option<&Measurement> {
        self.actions(market, test)?.get(action)
    }

    /// Gas for a cell, 0 when the entry is absent or unmeasured.
    pub fn gas(&self, market: &str, test: &str, action: &str) -> u64 {
        self.get(market, test, action).map_or(0, |m| m.gas_usage)
    }

    /// The action labels rendered for `test`: the longest action list any
    /// single market reported, earliest market winning ties. A test with no
    /// actions at all renders one row with an empty label.
    pub fn row(&self, test: &str) -> Vec<String> {
        let mut best: Option<&ActionResults> = None;
        for (_, tests) in self.markets.iter() {
            if let Some(actions) = tests.get(test) {
                if best.is_none_or(|b| actions.len() > b.len()) {
                    best = Some(actions);
                }
            }
        }
        match best {
            Some(actions) if !actions.is_empty() => actions.keys().map(str::to_string).collect(),
            _ => vec![String::new()],
        }
    }

    /// Range of nonzero gas values across markets for exactly (test, action).
    pub fn gas_range(&self, test: &str, action: &str) -> Option<GasRange> {
        self.markets
            .keys()
            .map(|market| self.gas(market, test, action))
            .filter(|gas| *gas > 0)
            .fold(None, |acc, gas| match acc {
                None => Some(GasRange { min: gas, max: gas }),
                Some(r) => Some(GasRange {
                    min: r.min.min(gas),
                    max: r.max.max(gas),
                }),
            })
    }
}

impl Serialize for ResultTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.markets.serialize(serializer)
    }
}

/// Build a table from parsed measurements, applying the call-mode filter.
pub fn aggregate<I>(measurements: I, mode: CallMode) -> ResultTable
where
    I: IntoIterator<Item = Measurement>,
{
    let mut table = ResultTable::new();
    for m in measurements {
        if !mode.admits(&m) {
            log::debug!(
                "dropping {} call [{}] ({}) ({}) under {:?}",
                if m.is_direct_call { "direct" } else { "eoa" },
                m.market,
                m.test_name,
                m.action_name,
                mode
            );
            continue;
        }
        table.insert(m);
    }
    table
}
