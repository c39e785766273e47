use crate::domain::meter_id::MeterId;
use crate::domain::meter_type::MeterType;
use crate::utils::error::{Result, SpectatorError};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// 一行 SpectatorD 協議：`<symbol>[,<ttl>]:<name>[,k=v]*:<value>`
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolLine {
    pub meter_type: MeterType,
    pub ttl_seconds: Option<u32>,
    pub id: MeterId,
    pub value: String,
}

impl ProtocolLine {
    fn malformed(line: &str, reason: &str) -> SpectatorError {
        SpectatorError::ProtocolError {
            line: line.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl FromStr for ProtocolLine {
    type Err = SpectatorError;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(&['\r', '\n'][..]);
        let parts: Vec<&str> = line.splitn(3, ':').collect();
        if parts.len() < 3 {
            return Err(Self::malformed(line, "expected <type>:<id>:<value>"));
        }

        let mut type_parts = parts[0].split(',');
        let mut symbol_chars = type_parts.next().unwrap_or_default().chars();
        let symbol = match (symbol_chars.next(), symbol_chars.next()) {
            (Some(c), None) => c,
            _ => return Err(Self::malformed(line, "meter type must be a single character")),
        };
        let meter_type = MeterType::from_symbol(symbol)
            .ok_or_else(|| Self::malformed(line, "unknown meter type"))?;
        let ttl_seconds = match type_parts.next() {
            Some(ttl) => Some(
                ttl.parse::<u32>()
                    .map_err(|_| Self::malformed(line, "ttl must be a number of seconds"))?,
            ),
            None => None,
        };

        let mut id_parts = parts[1].split(',');
        let name = id_parts.next().unwrap_or_default();
        if name.is_empty() {
            return Err(Self::malformed(line, "meter name is empty"));
        }
        let tags: Vec<(&str, &str)> = id_parts
            .filter_map(|segment| {
                let mut kv = segment.split('=');
                match (kv.next(), kv.next(), kv.next()) {
                    (Some(k), Some(v), None) => Some((k, v)),
                    _ => None,
                }
            })
            .collect();

        Ok(ProtocolLine {
            meter_type,
            ttl_seconds,
            id: MeterId::new(name, &tags),
            value: parts[2].to_string(),
        })
    }
}

impl fmt::Display for ProtocolLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.meter_type.symbol())?;
        if let Some(ttl) = self.ttl_seconds {
            write!(f, ",{}", ttl)?;
        }
        write!(f, ":{}", self.id.name())?;
        for (key, value) in self.id.tags() {
            write!(f, ",{}={}", key, value)?;
        }
        write!(f, ":{}", self.value)
    }
}

impl Serialize for ProtocolLine {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ProtocolLine", 5)?;
        state.serialize_field("type", &self.meter_type)?;
        state.serialize_field("ttl_seconds", &self.ttl_seconds)?;
        state.serialize_field("name", self.id.name())?;
        state.serialize_field("tags", self.id.tags())?;
        state.serialize_field("value", &self.value)?;
        state.end()
    }
}

/// 一個 datagram 可能帶多行（緩衝模式），逐行解析
pub fn parse_payload(payload: &str) -> Vec<Result<ProtocolLine>> {
    payload
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(ProtocolLine::from_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_line() {
        let line: ProtocolLine = "c:counter:1.000000".parse().unwrap();
        assert_eq!(line.meter_type, MeterType::Counter);
        assert_eq!(line.ttl_seconds, None);
        assert_eq!(line.id.name(), "counter");
        assert!(line.id.tags().is_empty());
        assert_eq!(line.value, "1.000000");
    }

    #[test]
    fn test_line_terminator_is_not_part_of_value() {
        let line: ProtocolLine = "A:age_gauge:0\n".parse().unwrap();
        assert_eq!(line.value, "0");
        assert_eq!(line.to_string(), "A:age_gauge:0");
    }

    #[test]
    fn test_parse_with_tags_and_ttl() {
        let line: ProtocolLine = "g,120:gauge,my-tags=bar,extra-tags=foo:42.000000"
            .parse()
            .unwrap();
        assert_eq!(line.meter_type, MeterType::Gauge);
        assert_eq!(line.ttl_seconds, Some(120));
        assert_eq!(line.id.tags().len(), 2);
        // 標籤排序後輸出
        assert_eq!(
            line.to_string(),
            "g,120:gauge,extra-tags=foo,my-tags=bar:42.000000"
        );
    }

    #[test]
    fn test_malformed_tag_segments_are_ignored() {
        let line: ProtocolLine = "t:latency,broken,a=1,x=y=z:0.5".parse().unwrap();
        assert_eq!(line.id.tags().len(), 1);
        assert_eq!(line.to_string(), "t:latency,a=1:0.5");
    }

    #[test]
    fn test_parse_errors() {
        assert!("c:counter".parse::<ProtocolLine>().is_err());
        assert!("x:counter:1".parse::<ProtocolLine>().is_err());
        assert!("cc:counter:1".parse::<ProtocolLine>().is_err());
        assert!("c::1".parse::<ProtocolLine>().is_err());
        assert!("g,abc:gauge:1".parse::<ProtocolLine>().is_err());
    }

    #[test]
    fn test_parse_payload_with_multiple_lines() {
        let results = parse_payload("c:a:1.000000\n\nbogus\nd:b:42\n");
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().value, "42");
    }

    #[test]
    fn test_json_shape() {
        let line: ProtocolLine = "T:req,app=web:0.250000".parse().unwrap();
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["type"], "percentile_timer");
        assert_eq!(json["name"], "req");
        assert_eq!(json["tags"]["app"], "web");
        assert_eq!(json["value"], "0.250000");
        assert!(json["ttl_seconds"].is_null());
    }
}
