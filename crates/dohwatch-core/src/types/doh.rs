use serde::{Deserialize, Serialize};
use std::fmt;

/// Address record types the resolver asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// IPv4 address record
    A,
    /// IPv6 address record
    Aaaa,
}

impl RecordType {
    /// Both address families, in query order
    pub const ALL: [Self; 2] = [Self::A, Self::Aaaa];

    /// Numeric RR type code as it appears in DNS JSON answers
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::A => 1,
            Self::Aaaa => 28,
        }
    }

    /// Mnemonic used in the `type` query parameter
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
        }
    }

    /// Map a numeric RR type back to an address record type
    #[must_use]
    pub const fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(Self::A),
            28 => Some(Self::Aaaa),
            _ => None,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// DNS JSON response (`application/dns-json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DohResponse {
    /// DNS RCODE, 0 is NOERROR
    #[serde(rename = "Status")]
    pub status: u32,

    /// Answer section, absent on NXDOMAIN or empty answers
    #[serde(rename = "Answer", default)]
    pub answer: Vec<DohAnswer>,
}

impl DohResponse {
    /// Returns true if the resolver reported NOERROR
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status == 0
    }

    /// Address values from A and AAAA answers, skipping CNAMEs and other types
    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.answer
            .iter()
            .filter(|a| RecordType::from_code(a.record_type).is_some())
            .map(|a| a.data.as_str())
    }
}

/// Single answer record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DohAnswer {
    /// Owner name
    #[serde(default)]
    pub name: Option<String>,

    /// Numeric RR type
    #[serde(rename = "type")]
    pub record_type: u16,

    /// Remaining TTL in seconds
    #[serde(rename = "TTL", default)]
    pub ttl: Option<u32>,

    /// Record data in presentation format
    pub data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_google_style_answer() {
        let json = r#"{
            "Status": 0, "TC": false, "RD": true, "RA": true,
            "Question": [{"name": "www.example.com.", "type": 1}],
            "Answer": [
                {"name": "www.example.com.", "type": 5, "TTL": 300, "data": "example.edgekey.net."},
                {"name": "example.edgekey.net.", "type": 1, "TTL": 20, "data": "23.215.0.136"}
            ]
        }"#;
        let resp: DohResponse = serde_json::from_str(json).unwrap();
        assert!(resp.is_success());
        assert_eq!(resp.addresses().collect::<Vec<_>>(), vec!["23.215.0.136"]);
    }

    #[test]
    fn missing_answer_is_empty() {
        let resp: DohResponse = serde_json::from_str(r#"{"Status": 3}"#).unwrap();
        assert!(!resp.is_success());
        assert_eq!(resp.addresses().count(), 0);
    }

    #[test]
    fn record_type_codes() {
        assert_eq!(RecordType::A.code(), 1);
        assert_eq!(RecordType::Aaaa.code(), 28);
        assert_eq!(RecordType::from_code(5), None);
        assert_eq!(RecordType::Aaaa.to_string(), "AAAA");
    }
}
