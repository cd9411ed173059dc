//! Serde helpers shared by the configuration types

/// `Duration` as whole seconds
///
/// Serializes to an integer. Deserializes from an integer number of seconds
/// or from a string with a unit suffix (`"500ms"`, `"10s"`, `"2m"`).
pub mod duration_secs {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Secs(u64),
        Text(String),
    }

    /// Serialize a Duration as seconds (u64)
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    /// Deserialize a Duration from seconds or a suffixed string
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            Raw::Secs(secs) => Ok(Duration::from_secs(secs)),
            Raw::Text(text) => parse(&text).map_err(de::Error::custom),
        }
    }

    fn parse(text: &str) -> Result<Duration, String> {
        let text = text.trim();
        let split = text
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(text.len());
        let (digits, unit) = text.split_at(split);
        let value: u64 = digits
            .parse()
            .map_err(|_| format!("invalid duration: {:?}", text))?;

        match unit.trim() {
            "" | "s" => Ok(Duration::from_secs(value)),
            "ms" => Ok(Duration::from_millis(value)),
            "m" => Ok(Duration::from_secs(value * 60)),
            other => Err(format!("unknown duration unit {:?}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Timeouts {
        #[serde(with = "duration_secs")]
        connect: Duration,
    }

    #[test]
    fn test_serialize_as_seconds() {
        let value = Timeouts {
            connect: Duration::from_secs(10),
        };
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"{"connect":10}"#);
    }

    #[test]
    fn test_deserialize_integer() {
        let value: Timeouts = serde_json::from_str(r#"{"connect":7}"#).unwrap();
        assert_eq!(value.connect, Duration::from_secs(7));
    }

    #[test]
    fn test_deserialize_suffixed() {
        let value: Timeouts = serde_json::from_str(r#"{"connect":"1500ms"}"#).unwrap();
        assert_eq!(value.connect, Duration::from_millis(1500));

        let value: Timeouts = serde_json::from_str(r#"{"connect":"2m"}"#).unwrap();
        assert_eq!(value.connect, Duration::from_secs(120));

        let value: Timeouts = serde_json::from_str(r#"{"connect":"10s"}"#).unwrap();
        assert_eq!(value.connect, Duration::from_secs(10));
    }

    #[test]
    fn test_deserialize_rejects_garbage() {
        assert!(serde_json::from_str::<Timeouts>(r#"{"connect":"soon"}"#).is_err());
        assert!(serde_json::from_str::<Timeouts>(r#"{"connect":"5h"}"#).is_err());
    }
}
