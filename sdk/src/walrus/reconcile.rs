use std::{collections::BTreeMap, fmt};

/// Attribute name to expected value, as supplied by the caller.
pub type ExpectedAttributes = BTreeMap<String, String>;

/// One expected attribute that the stored blob does not carry as expected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mismatch {
    pub key: String,
    pub expected: String,
    /// `None` when the key is missing altogether.
    pub actual: Option<String>,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.actual {
            Some(actual) => write!(
                f,
                "{}: expected \"{}\", got \"{}\"",
                self.key, self.expected, actual
            ),
            None => write!(
                f,
                "{}: expected \"{}\", got <missing>",
                self.key, self.expected
            ),
        }
    }
}

/// Compare the caller's expectations against the attributes read back.
///
/// Only expected keys are checked. Extra keys in `actual` are ignored. When
/// `actual` is `None` every expected key is reported as missing. Mismatches
/// come out in key order.
pub fn reconcile(
    expected: &ExpectedAttributes,
    actual: Option<&BTreeMap<String, String>>,
) -> Vec<Mismatch> {
    expected
        .iter()
        .filter_map(|(key, expected_value)| {
            let actual_value = actual.and_then(|attributes| attributes.get(key));

            match actual_value {
                Some(value) if value == expected_value => None,
                _ => Some(Mismatch {
                    key: key.clone(),
                    expected: expected_value.clone(),
                    actual: actual_value.cloned(),
                }),
            }
        })
        .collect()
}
