// ── Grocy query filters ──
//
// Grocy list endpoints accept repeated `query[]` parameters of the form
// `<field><condition><value>`, all of which must match (logical AND).

use std::fmt;
use std::str::FromStr;

/// Comparison operator understood by Grocy's `query[]` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumIter)]
pub enum Condition {
    Equal,
    NotEqual,
    Like,
    NotLike,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    Regex,
}

impl Condition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Like => "~",
            Self::NotLike => "!~",
            Self::LessThan => "<",
            Self::GreaterThan => ">",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThanOrEqual => ">=",
            Self::Regex => "§",
        }
    }

    // Two-character operators first so `<=` is not read as `<`.
    const PARSE_ORDER: [Self; 9] = [
        Self::NotEqual,
        Self::NotLike,
        Self::LessThanOrEqual,
        Self::GreaterThanOrEqual,
        Self::Equal,
        Self::Like,
        Self::LessThan,
        Self::GreaterThan,
        Self::Regex,
    ];
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `field<op>value` filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFilter {
    pub field: String,
    pub condition: Condition,
    pub value: String,
}

impl QueryFilter {
    pub fn new(field: impl Into<String>, condition: Condition, value: impl ToString) -> Self {
        Self {
            field: field.into(),
            condition,
            value: value.to_string(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl ToString) -> Self {
        Self::new(field, Condition::Equal, value)
    }

    pub fn lt(field: impl Into<String>, value: impl ToString) -> Self {
        Self::new(field, Condition::LessThan, value)
    }

    pub fn gt(field: impl Into<String>, value: impl ToString) -> Self {
        Self::new(field, Condition::GreaterThan, value)
    }
}

impl fmt::Display for QueryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.field, self.condition, self.value)
    }
}

/// Error returned when a filter expression has no operator or no field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid query filter {0:?}: expected <field><operator><value>")]
pub struct ParseFilterError(pub String);

impl FromStr for QueryFilter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for (idx, _) in s.char_indices() {
            let rest = &s[idx..];
            let Some(condition) = Condition::PARSE_ORDER
                .into_iter()
                .find(|c| rest.starts_with(c.as_str()))
            else {
                continue;
            };
            let field = s[..idx].trim();
            if field.is_empty() {
                return Err(ParseFilterError(s.to_owned()));
            }
            let value = &rest[condition.as_str().len()..];
            return Ok(Self::new(field, condition, value));
        }
        Err(ParseFilterError(s.to_owned()))
    }
}

/// Render filters as repeated `query[]` pairs for `RequestBuilder::query`.
pub fn to_query_params(filters: &[QueryFilter]) -> Vec<(&'static str, String)> {
    filters.iter().map(|f| ("query[]", f.to_string())).collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    #[test]
    fn renders_grocy_syntax() {
        let filter = QueryFilter::lt("next_estimated_execution_time", "2024-05-01 10:00:00");
        assert_eq!(
            filter.to_string(),
            "next_estimated_execution_time<2024-05-01 10:00:00"
        );
        assert_eq!(
            QueryFilter::new("due_date", Condition::Regex, r".*\S.*").to_string(),
            r"due_date§.*\S.*"
        );
    }

    #[test]
    fn parses_two_char_operators_before_single() {
        let filter: QueryFilter = "day>=2024-01-01".parse().unwrap();
        assert_eq!(filter.field, "day");
        assert_eq!(filter.condition, Condition::GreaterThanOrEqual);
        assert_eq!(filter.value, "2024-01-01");

        let filter: QueryFilter = "name!~milk".parse().unwrap();
        assert_eq!(filter.condition, Condition::NotLike);
        assert_eq!(filter.value, "milk");
    }

    #[test]
    fn every_condition_parses_back() {
        for condition in Condition::iter() {
            let text = format!("field{condition}value");
            let parsed: QueryFilter = text.parse().unwrap();
            assert_eq!(parsed.condition, condition, "{text}");
            assert_eq!(parsed.value, "value");
        }
    }

    #[test]
    fn rejects_missing_field_or_operator() {
        assert!("=5".parse::<QueryFilter>().is_err());
        assert!("name".parse::<QueryFilter>().is_err());
    }

    #[test]
    fn query_params_repeat_key() {
        let params = to_query_params(&[QueryFilter::eq("done", 0), QueryFilter::gt("id", 3)]);
        assert_eq!(
            params,
            vec![("query[]", "done=0".to_owned()), ("query[]", "id>3".to_owned())]
        );
    }
}
