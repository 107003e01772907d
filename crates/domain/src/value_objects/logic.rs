use serde::{Deserialize, Serialize};

/// How a rule combines condition results, both inside a condition group and
/// across groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogicOperator {
    /// All conditions must be met
    #[default]
    #[serde(rename = "AND", alias = "and")]
    And,
    /// Any single condition is enough
    #[serde(rename = "OR", alias = "or")]
    Or,
}

impl LogicOperator {
    /// Fold a sequence of results with this operator.
    ///
    /// An empty sequence is never satisfied: vacuous truth would turn a rule
    /// without conditions into a global rule.
    pub fn combine(self, results: impl IntoIterator<Item = bool>) -> bool {
        let mut seen_any = false;
        let mut all = true;
        let mut any = false;
        for result in results {
            seen_any = true;
            all &= result;
            any |= result;
        }
        seen_any
            && match self {
                Self::And => all,
                Self::Or => any,
            }
    }
}

impl std::fmt::Display for LogicOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogicOperator::And => write!(f, "AND"),
            LogicOperator::Or => write!(f, "OR"),
        }
    }
}
