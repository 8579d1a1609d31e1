//! Reconciliation of the employee counts D&B reports for an entity.

use crate::cell::Cell;
use crate::header::Label;
use crate::models::EmployeeCount;

/// Information scope of an employee count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeScope {
    Individual,
    HeadQuarters,
    Consolidated,
}

impl EmployeeScope {
    pub fn dnb_code(self) -> i64 {
        match self {
            EmployeeScope::Individual => 9066,
            EmployeeScope::HeadQuarters => 9068,
            EmployeeScope::Consolidated => 9067,
        }
    }

    fn rank(code: Option<i64>) -> Option<u8> {
        match code? {
            9066 => Some(1),
            9068 => Some(2),
            9067 => Some(3),
            _ => None,
        }
    }
}

/// Reliability codes shared by employee counts and financial figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reliability {
    Actual,
    Estimated,
    Modelled,
}

impl Reliability {
    pub fn dnb_code(self) -> i64 {
        match self {
            Reliability::Actual => 9092,
            Reliability::Estimated => 9093,
            Reliability::Modelled => 9094,
        }
    }

    pub fn from_dnb_code(code: i64) -> Option<Self> {
        match code {
            9092 => Some(Reliability::Actual),
            9093 => Some(Reliability::Estimated),
            9094 => Some(Reliability::Modelled),
            _ => None,
        }
    }

    /// Actual beats modelled beats estimated.
    fn employee_rank(code: Option<i64>) -> Option<u8> {
        match Self::from_dnb_code(code?)? {
            Reliability::Actual => Some(1),
            Reliability::Modelled => Some(2),
            Reliability::Estimated => Some(3),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmplComponent {
    Value,
    Scope,
    Reliability,
}

impl EmplComponent {
    pub fn desc(self) -> &'static str {
        match self {
            EmplComponent::Value => "number of employees",
            EmplComponent::Scope => "information scope (num empl)",
            EmplComponent::Reliability => "reliability (num empl)",
        }
    }

    fn value(self, count: &EmployeeCount) -> Cell {
        match self {
            EmplComponent::Value => count.value.as_ref().into(),
            EmplComponent::Scope => count.information_scope_description.as_ref().into(),
            EmplComponent::Reliability => count.reliability_description.as_ref().into(),
        }
    }
}

/// Sort key: scope rank first, then reliability rank. Codes outside a
/// table sort after every ranked code.
fn preference(count: &EmployeeCount) -> (u8, u8) {
    (
        EmployeeScope::rank(count.information_scope_dnb_code).unwrap_or(u8::MAX),
        Reliability::employee_rank(count.reliability_dnb_code).unwrap_or(u8::MAX),
    )
}

/// Up to `count` employee counts, best first, padded with nulls.
///
/// A non-empty `scopes` keeps only counts of those scopes.
pub fn employee_values(
    counts: &[EmployeeCount],
    scopes: &[EmployeeScope],
    components: &[EmplComponent],
    count: usize,
) -> Vec<Cell> {
    let mut candidates: Vec<&EmployeeCount> = counts
        .iter()
        .filter(|c| {
            scopes.is_empty()
                || scopes
                    .iter()
                    .any(|scope| c.information_scope_dnb_code == Some(scope.dnb_code()))
        })
        .collect();
    candidates.sort_by_key(|c| preference(c));

    let mut cells: Vec<Cell> = candidates
        .into_iter()
        .take(count)
        .flat_map(|c| components.iter().map(move |component| component.value(c)))
        .collect();
    cells.resize(count * components.len(), Cell::Null);

    cells
}

/// Labels for [`employee_values`]. Slots are numbered from the base index
/// when one is set.
pub fn employee_labels(components: &[EmplComponent], count: usize, base: &Label) -> Vec<String> {
    base.repeat(components.iter().map(|c| c.desc()), count)
}
