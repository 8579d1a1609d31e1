//! Column labels for the header row.

use std::fmt;

/// Base label of a column group.
///
/// Renders as `[prefix ]text[ suffix][ index]`. Selectors take one of these
/// for their group and override the text (and, for repeated slots, the
/// index) per column, e.g. `global ult duns`, `registration number 2` or
/// `activity code (NACE)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Label {
    pub text: Option<String>,
    pub index: Option<usize>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

impl Label {
    /// A stand-alone column label.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// An empty base label for a column group.
    pub fn group() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Renders this label with `text` as the column text; `index` replaces
    /// the base index when given.
    pub fn render(&self, text: &str, index: Option<usize>) -> String {
        Label {
            text: Some(text.to_string()),
            index: index.or(self.index),
            prefix: self.prefix.clone(),
            suffix: self.suffix.clone(),
        }
        .to_string()
    }

    /// Labels for `count` repetitions of a component group. Slots are
    /// numbered from the base index (or 1) when more than one is requested.
    pub fn repeat<'a, I>(&self, descriptions: I, count: usize) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str> + Clone,
    {
        let start = self.index.unwrap_or(1);

        (0..count)
            .flat_map(|slot| {
                let index = if count > 1 { Some(start + slot) } else { None };
                descriptions
                    .clone()
                    .into_iter()
                    .map(move |desc| self.render(desc, index))
            })
            .collect()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref prefix) = self.prefix {
            write!(f, "{} ", prefix)?;
        }
        f.write_str(self.text.as_deref().unwrap_or_default())?;
        if let Some(ref suffix) = self.suffix {
            write!(f, " {}", suffix)?;
        }
        if let Some(index) = self.index {
            write!(f, " {}", index)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_rendering() {
        assert_eq!(Label::new("DUNS").to_string(), "DUNS");
        assert_eq!(
            Label::group().with_prefix("global ult").render("duns", None),
            "global ult duns"
        );
        assert_eq!(
            Label::group().with_suffix("(NACE)").render("activity code", None),
            "activity code (NACE)"
        );
        assert_eq!(
            Label::group().with_index(3).render("number of employees", None),
            "number of employees 3"
        );
    }

    #[test]
    fn test_repeat_numbers_slots() {
        let labels = Label::group().repeat(["registration number", "type"], 2);
        assert_eq!(
            labels,
            vec![
                "registration number 1",
                "type 1",
                "registration number 2",
                "type 2"
            ]
        );

        let labels = Label::group().repeat(["registration number"], 1);
        assert_eq!(labels, vec!["registration number"]);
    }
}
