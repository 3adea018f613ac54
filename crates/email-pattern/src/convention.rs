//! Username naming conventions.
//!
//! A [`Convention`] is a fixed rule that turns a person's first and last name
//! into the local part of an email address. Conventions are stateless; every
//! rule operates on names that have already been trimmed and lower-cased (see
//! [`crate::normalise_name`]).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConventionError, NameComponent, UnknownConventionLabel};

/// A rule mapping a first and last name to a username.
///
/// The string form of each variant is the label used in exported tables and
/// accepted in the `Email Format` column of direct-mode input.
///
/// # Example
///
/// ```
/// use email_pattern::Convention;
///
/// let username = Convention::FirstNameDotLastName
///     .construct("jane", "doe")
///     .expect("both names present");
/// assert_eq!(username, "jane.doe");
/// assert_eq!(Convention::FirstNameDotLastName.label(), "FirstName.LastName");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Convention {
    /// `first.last`
    #[serde(rename = "FirstName.LastName")]
    FirstNameDotLastName,
    /// `first_last`
    #[serde(rename = "FirstName_LastName")]
    FirstNameUnderscoreLastName,
    /// `firstlast`
    #[serde(rename = "FirstNameLastName")]
    FirstNameLastName,
    /// First initial followed by the last name, `flast`.
    #[serde(rename = "FirstLetterLastName")]
    FirstLetterLastName,
    /// First name followed by the last initial, `firstl`.
    #[default]
    #[serde(rename = "FirstNameFirstLetterLastName")]
    FirstNameFirstLetterLastName,
    /// The literal letter `d` followed by the first name.
    ///
    /// The last name does not take part in this rule despite the label.
    #[serde(rename = "LastNameFirstLetterFirstName")]
    LastNameFirstLetterFirstName,
    /// `last`
    #[serde(rename = "LastName")]
    LastName,
    /// `first`
    #[serde(rename = "FirstName")]
    FirstName,
}

impl Convention {
    /// Every convention, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::FirstNameDotLastName,
        Self::FirstNameUnderscoreLastName,
        Self::FirstNameLastName,
        Self::FirstLetterLastName,
        Self::FirstNameFirstLetterLastName,
        Self::LastNameFirstLetterFirstName,
        Self::LastName,
        Self::FirstName,
    ];

    /// Returns the canonical label for this convention.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FirstNameDotLastName => "FirstName.LastName",
            Self::FirstNameUnderscoreLastName => "FirstName_LastName",
            Self::FirstNameLastName => "FirstNameLastName",
            Self::FirstLetterLastName => "FirstLetterLastName",
            Self::FirstNameFirstLetterLastName => "FirstNameFirstLetterLastName",
            Self::LastNameFirstLetterFirstName => "LastNameFirstLetterFirstName",
            Self::LastName => "LastName",
            Self::FirstName => "FirstName",
        }
    }

    /// Maps a free-text format label onto a convention.
    ///
    /// Surrounding whitespace is ignored; the comparison is otherwise exact.
    /// Labels that name no convention fall back to [`Convention::default`].
    ///
    /// ```
    /// use email_pattern::Convention;
    ///
    /// assert_eq!(Convention::from_label(" LastName "), Convention::LastName);
    /// assert_eq!(
    ///     Convention::from_label("first-dot-last"),
    ///     Convention::FirstNameFirstLetterLastName
    /// );
    /// ```
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        label.parse().unwrap_or_default()
    }

    /// Builds a username from normalised name parts.
    ///
    /// # Errors
    ///
    /// Returns [`ConventionError::EmptyNameComponent`] when the rule takes the
    /// initial of a name part that is empty.
    pub fn construct(self, first: &str, last: &str) -> Result<String, ConventionError> {
        let username = match self {
            Self::FirstNameDotLastName => format!("{first}.{last}"),
            Self::FirstNameUnderscoreLastName => format!("{first}_{last}"),
            Self::FirstNameLastName => format!("{first}{last}"),
            Self::FirstLetterLastName => {
                let initial = self.initial(first, NameComponent::First)?;
                format!("{initial}{last}")
            }
            Self::FirstNameFirstLetterLastName => {
                let initial = self.initial(last, NameComponent::Last)?;
                format!("{first}{initial}")
            }
            Self::LastNameFirstLetterFirstName => format!("d{first}"),
            Self::LastName => last.to_owned(),
            Self::FirstName => first.to_owned(),
        };
        Ok(username)
    }

    fn initial(self, part: &str, component: NameComponent) -> Result<char, ConventionError> {
        part.chars()
            .next()
            .ok_or(ConventionError::EmptyNameComponent {
                convention: self,
                component,
            })
    }
}

impl fmt::Display for Convention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Convention {
    type Err = UnknownConventionLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|convention| convention.label() == trimmed)
            .ok_or_else(|| UnknownConventionLabel {
                label: s.to_owned(),
            })
    }
}
