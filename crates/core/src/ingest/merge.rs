use crate::ingest::types::PartialFundamentals;

/// Outcome of resolving one field across ordered sources.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<T> {
    Value { value: T, source: &'static str },
    Unresolved,
}

impl<T> Resolved<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Resolved::Value { value, .. } => Some(value),
            Resolved::Unresolved => None,
        }
    }

    pub fn source(&self) -> Option<&'static str> {
        match self {
            Resolved::Value { source, .. } => Some(*source),
            Resolved::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolved::Value { .. })
    }
}

/// First candidate that carries a value wins. Presence is all that counts, so a
/// zero from an earlier source beats a non-zero from a later one.
pub fn first_defined<T, I>(candidates: I) -> Resolved<T>
where
    I: IntoIterator<Item = (&'static str, Option<T>)>,
{
    candidates
        .into_iter()
        .find_map(|(source, value)| value.map(|value| Resolved::Value { value, source }))
        .unwrap_or(Resolved::Unresolved)
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergedFundamentals {
    pub name: Resolved<String>,
    pub logo: Resolved<String>,
    pub pe: Resolved<f64>,
    pub pb: Resolved<f64>,
    pub dividend_yield: Resolved<f64>,
}

/// Merges the primary source with the secondaries. The primary wins for every
/// field except the logo, where secondaries are preferred.
pub fn merge_fundamentals(
    primary: &PartialFundamentals,
    secondaries: &[PartialFundamentals],
) -> MergedFundamentals {
    let ordered = || std::iter::once(primary).chain(secondaries.iter());

    MergedFundamentals {
        name: first_defined(ordered().map(|p| (p.source, p.name.clone()))),
        logo: first_defined(
            secondaries
                .iter()
                .chain(std::iter::once(primary))
                .map(|p| (p.source, p.logo.clone())),
        ),
        pe: first_defined(ordered().map(|p| (p.source, p.pe))),
        pb: first_defined(ordered().map(|p| (p.source, p.pb))),
        dividend_yield: first_defined(ordered().map(|p| (p.source, p.dividend_yield))),
    }
}
