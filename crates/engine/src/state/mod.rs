//! Property schemas and packed block states.
//!
//! A block type declares an ordered list of properties, each with a finite
//! list of string values. Every combination of values is one block state;
//! the type owns a contiguous run of `BlockId`s, one per combination, packed
//! mixed-radix with the first declared property as the most significant
//! digit.

pub mod cell;

pub use cell::BlockCell;

use std::collections::HashMap;

/// One named, discrete-valued property (`facing`, `waterlogged`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub values: Vec<String>,
}

impl Property {
    pub fn new(name: impl Into<String>, values: &[&str]) -> Self {
        Self {
            name: name.into(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    /// `true`/`false`, in that order.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, &["true", "false"])
    }

    pub fn position(&self, value: &str) -> Option<usize> {
        self.values.iter().position(|v| v == value)
    }
}

/// Compiled layout of a type's properties.
#[derive(Debug, Clone, Default)]
pub struct StateSchema {
    properties: Vec<Property>,
    strides: Vec<u32>,
    index: HashMap<String, usize>,
    state_count: u32,
}

impl StateSchema {
    /// Lay out `properties`. Callers are expected to have rejected empty or
    /// duplicate properties already (the registry builder does).
    pub fn new(properties: Vec<Property>) -> Self {
        let mut strides = vec![1u32; properties.len()];
        let mut acc: u32 = 1;
        for (i, prop) in properties.iter().enumerate().rev() {
            strides[i] = acc;
            acc = acc.saturating_mul(prop.values.len().max(1) as u32);
        }
        let index = properties
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.clone(), i))
            .collect();
        Self {
            properties,
            strides,
            index,
            state_count: acc,
        }
    }

    /// Number of distinct states (product of value counts, 1 with no
    /// properties).
    pub fn state_count(&self) -> u32 {
        self.state_count
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.index.get(name).map(|&i| &self.properties[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    #[inline]
    fn digit(&self, offset: u32, i: usize) -> usize {
        let len = self.properties[i].values.len() as u32;
        ((offset / self.strides[i]) % len) as usize
    }

    /// Value of `name` in the state at `offset` within this type's id run.
    pub fn value_of(&self, offset: u32, name: &str) -> Option<&str> {
        let &i = self.index.get(name)?;
        self.properties[i]
            .values
            .get(self.digit(offset, i))
            .map(String::as_str)
    }

    /// The offset of the state equal to `offset` except that `name` is
    /// `value`. `None` when the property or value is not declared.
    pub fn with_value(&self, offset: u32, name: &str, value: &str) -> Option<u32> {
        let &i = self.index.get(name)?;
        let new_digit = self.properties[i].position(value)? as u32;
        let old_digit = self.digit(offset, i) as u32;
        Some(offset - old_digit * self.strides[i] + new_digit * self.strides[i])
    }

    /// All `(name, value)` pairs of the state at `offset`, in declaration
    /// order.
    pub fn values(&self, offset: u32) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.properties.iter().enumerate().map(move |(i, p)| {
            (p.name.as_str(), p.values[self.digit(offset, i)].as_str())
        })
    }

    /// Pack explicit values on top of `base`. Unknown properties or values
    /// yield `None`.
    pub fn pack<'a>(
        &self,
        base: u32,
        values: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Option<u32> {
        values
            .into_iter()
            .try_fold(base, |offset, (name, value)| self.with_value(offset, name, value))
    }
}
