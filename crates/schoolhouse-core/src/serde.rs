use serde::{Deserialize, Deserializer};

/// Deserializes an optional string into an optional i64.
///
/// Query strings arrive as text; an empty value (`?department_id=`) is
/// treated as absent instead of a parse failure.
pub fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s.trim().parse::<i64>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Filter {
        #[serde(default, deserialize_with = "deserialize_optional_i64")]
        department_id: Option<i64>,
    }

    #[test]
    fn test_parses_number() {
        let f: Filter = serde_json::from_str(r#"{"department_id":"42"}"#).unwrap();
        assert_eq!(f.department_id, Some(42));
    }

    #[test]
    fn test_empty_and_missing_are_none() {
        let f: Filter = serde_json::from_str(r#"{"department_id":""}"#).unwrap();
        assert_eq!(f.department_id, None);
        let f: Filter = serde_json::from_str("{}").unwrap();
        assert_eq!(f.department_id, None);
    }

    #[test]
    fn test_garbage_is_rejected() {
        let result: Result<Filter, _> = serde_json::from_str(r#"{"department_id":"cs"}"#);
        assert!(result.is_err());
    }
}
