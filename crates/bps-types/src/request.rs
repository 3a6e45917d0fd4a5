use serde::{Deserialize, Serialize};

use crate::plane::PLANE_COUNT;

#[allow(clippy::cast_possible_truncation)]
const fn all_planes() -> u32 {
    PLANE_COUNT as u32
}

/// A time-range query, sent as the request body.
///
/// ```json
/// { "planes": 12, "from": 1718000000.0, "to": 1718000060.0 }
/// ```
///
/// `planes` defaults to 16. `from` and `to` are required epoch seconds.
/// Any field not listed here rejects the request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryRequest {
    #[serde(default = "all_planes")]
    pub planes: u32,
    pub from: f64,
    pub to: f64,
}

impl QueryRequest {
    /// Query `[from, to]` at full precision.
    #[must_use]
    pub fn new(from: f64, to: f64) -> Self {
        Self {
            planes: all_planes(),
            from,
            to,
        }
    }

    #[must_use]
    pub fn with_planes(mut self, planes: u32) -> Self {
        self.planes = planes;
        self
    }

    /// Serialize to the JSON request body.
    ///
    /// # Errors
    ///
    /// Propagates the `serde_json` serializer error.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Parse a JSON request body.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error for invalid UTF-8/JSON, a missing
    /// `from`/`to`, a wrongly typed field, or an unrecognised field.
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planes_default_to_sixteen() {
        let req = QueryRequest::from_json(br#"{"from": 1.5, "to": 2}"#).unwrap();
        assert_eq!(req, QueryRequest::new(1.5, 2.0));
        assert_eq!(req.planes, 16);
    }

    #[test]
    fn roundtrip_json() {
        let req = QueryRequest::new(10.0, 20.0).with_planes(9);
        let parsed = QueryRequest::from_json(&req.to_json().unwrap()).unwrap();
        assert_eq!(parsed, req);
    }

    #[test]
    fn missing_bound_fails() {
        assert!(QueryRequest::from_json(br#"{"planes": 8, "from": 1.0}"#).is_err());
    }

    #[test]
    fn unknown_field_fails() {
        let body = br#"{"from": 1.0, "to": 2.0, "algo": "lz4"}"#;
        assert!(QueryRequest::from_json(body).is_err());
    }

    #[test]
    fn negative_planes_fail() {
        assert!(QueryRequest::from_json(br#"{"planes": -1, "from": 1.0, "to": 2.0}"#).is_err());
    }

    #[test]
    fn not_json_fails() {
        assert!(QueryRequest::from_json(b"\xff\xfe").is_err());
    }
}
