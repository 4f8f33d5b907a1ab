//! Request signing for the affiliate API.
//!
//! The upstream API authenticates a call by a `sign` parameter computed as
//! `UPPER_HEX(SHA256(k1 v1 k2 v2 ... secret))` over every non-empty parameter
//! sorted by key. The secret is only appended to the hashed string; this is not
//! an HMAC and gives no keyed-hash guarantees. It must stay bit-for-bit
//! compatible with what the gateway verifies.

use crate::config::Credentials;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

pub const SIGN_METHOD: &str = "sha256";
pub const API_VERSION: &str = "2.0";
pub const RESPONSE_FORMAT: &str = "json";

/// Caller parameters, kept sorted by key (byte order).
pub type Params = BTreeMap<String, ParamValue>;

/// Errors for parameter sets that cannot be signed
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SignatureError {
    #[error("method name must not be empty")]
    EmptyMethod,
    #[error("parameter names must not be empty")]
    EmptyKey,
    #[error("parameter '{key}' has unsupported {kind} value")]
    UnsupportedValue { key: String, kind: &'static str },
    #[error("parameter '{key}' is not a finite number")]
    NonFiniteNumber { key: String },
}

/// A single API parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Null,
}

impl ParamValue {
    /// Render for the wire. `None` means the parameter is omitted.
    fn render(&self, key: &str) -> Result<Option<String>, SignatureError> {
        match self {
            ParamValue::Null => Ok(None),
            ParamValue::Text(s) if s.is_empty() => Ok(None),
            ParamValue::Text(s) => Ok(Some(s.clone())),
            ParamValue::Integer(n) => Ok(Some(n.to_string())),
            ParamValue::Decimal(f) if !f.is_finite() => Err(SignatureError::NonFiniteNumber {
                key: key.to_string(),
            }),
            ParamValue::Decimal(f) => Ok(Some(f.to_string())),
        }
    }

    /// Convert a JSON value. Booleans, arrays and objects have no wire form.
    pub fn from_json(key: &str, value: &Value) -> Result<Self, SignatureError> {
        let unsupported = |kind| SignatureError::UnsupportedValue {
            key: key.to_string(),
            kind,
        };
        match value {
            Value::Null => Ok(ParamValue::Null),
            Value::String(s) => Ok(ParamValue::Text(s.clone())),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(ParamValue::Integer(i)),
                None => match n.as_u64() {
                    Some(u) => Ok(ParamValue::Text(u.to_string())),
                    None => n
                        .as_f64()
                        .map(ParamValue::Decimal)
                        .ok_or_else(|| unsupported("number")),
                },
            },
            Value::Bool(_) => Err(unsupported("boolean")),
            Value::Array(_) => Err(unsupported("array")),
            Value::Object(_) => Err(unsupported("object")),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Text(s)
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        ParamValue::Integer(n)
    }
}

impl From<u32> for ParamValue {
    fn from(n: u32) -> Self {
        ParamValue::Integer(i64::from(n))
    }
}

impl From<f64> for ParamValue {
    fn from(f: f64) -> Self {
        ParamValue::Decimal(f)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ParamValue::Null)
    }
}

/// Build `Params` from a JSON object, rejecting values with no wire form.
pub fn params_from_json(object: &serde_json::Map<String, Value>) -> Result<Params, SignatureError> {
    object
        .iter()
        .map(|(k, v)| Ok((k.clone(), ParamValue::from_json(k, v)?)))
        .collect()
}

/// A fully signed parameter set ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    method: String,
    params: BTreeMap<String, String>,
    sign: String,
}

impl SignedRequest {
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn sign(&self) -> &str {
        &self.sign
    }

    /// Signed parameters, without `sign` itself.
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// All query pairs, `sign` included.
    pub fn query_pairs(&self) -> Vec<(&str, &str)> {
        self.params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(std::iter::once(("sign", self.sign.as_str())))
            .collect()
    }
}

/// Signs calls on behalf of one app key.
#[derive(Clone)]
pub struct SignatureBuilder {
    app_key: String,
    app_secret: String,
}

impl SignatureBuilder {
    pub fn new(app_key: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            app_key: app_key.into(),
            app_secret: app_secret.into(),
        }
    }

    pub fn from_credentials(credentials: &Credentials) -> Self {
        Self::new(
            credentials.app_key.clone(),
            credentials.app_secret.clone(),
        )
    }

    /// Sign with the current time.
    pub fn sign(&self, method: &str, params: &Params) -> Result<SignedRequest, SignatureError> {
        self.sign_at(method, params, chrono::Utc::now().timestamp())
    }

    /// Sign with an explicit epoch-seconds timestamp.
    pub fn sign_at(
        &self,
        method: &str,
        params: &Params,
        timestamp: i64,
    ) -> Result<SignedRequest, SignatureError> {
        if method.trim().is_empty() {
            return Err(SignatureError::EmptyMethod);
        }

        let mut merged = BTreeMap::new();
        for (key, value) in params {
            if key.is_empty() {
                return Err(SignatureError::EmptyKey);
            }
            if key == "sign" {
                continue;
            }
            if let Some(rendered) = value.render(key)? {
                merged.insert(key.clone(), rendered);
            }
        }

        merged.insert("app_key".to_string(), self.app_key.clone());
        merged.insert("timestamp".to_string(), timestamp.to_string());
        merged.insert("format".to_string(), RESPONSE_FORMAT.to_string());
        merged.insert("v".to_string(), API_VERSION.to_string());
        merged.insert("sign_method".to_string(), SIGN_METHOD.to_string());
        merged.insert("method".to_string(), method.to_string());
        merged.retain(|_, v| !v.is_empty());

        let sign = digest(&canonical_string(&merged, &self.app_secret));
        Ok(SignedRequest {
            method: method.to_string(),
            params: merged,
            sign,
        })
    }
}

/// The exact string that gets hashed: sorted `key + value` pairs, then the secret.
pub fn canonical_string(params: &BTreeMap<String, String>, secret: &str) -> String {
    let mut out = String::new();
    for (key, value) in params {
        if value.is_empty() {
            continue;
        }
        out.push_str(key);
        out.push_str(value);
    }
    out.push_str(secret);
    out
}

/// Uppercase hex SHA-256.
pub fn digest(canonical: &str) -> String {
    hex::encode_upper(Sha256::digest(canonical.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CATEGORY_GET: &str = "aliexpress.affiliate.category.get";

    fn system_params() -> Params {
        let mut params = Params::new();
        params.insert("app_key".into(), "123".into());
        params.insert("timestamp".into(), "1700000000".into());
        params.insert("format".into(), "json".into());
        params.insert("v".into(), "2.0".into());
        params.insert("sign_method".into(), "sha256".into());
        params.insert("method".into(), CATEGORY_GET.into());
        params
    }

    #[test]
    fn test_golden_signature() {
        let builder = SignatureBuilder::new("123", "S");
        let signed = builder
            .sign_at(CATEGORY_GET, &system_params(), 1_700_000_000)
            .unwrap();

        assert_eq!(
            canonical_string(signed.params(), "S"),
            "app_key123formatjsonmethodaliexpress.affiliate.category.getsign_methodsha256timestamp1700000000v2.0S"
        );
        assert_eq!(
            signed.sign(),
            "6897986FE446E7B97CB531467EEF810BF5CC382FE5C4799CA85E20553111612B"
        );
    }

    #[test]
    fn test_signature_is_deterministic() {
        let builder = SignatureBuilder::new("123", "S");
        let mut params = Params::new();
        params.insert("keywords".into(), "usb cable".into());
        params.insert("page_no".into(), 2u32.into());

        let a = builder.sign_at("m", &params, 1_700_000_000).unwrap();
        let b = builder.sign_at("m", &params, 1_700_000_000).unwrap();
        assert_eq!(a, b);

        let later = builder.sign_at("m", &params, 1_700_000_001).unwrap();
        assert_ne!(a.sign(), later.sign());
    }

    #[test]
    fn test_canonical_string_orders_keys() {
        let mut params = BTreeMap::new();
        params.insert("b".to_string(), "2".to_string());
        params.insert("a".to_string(), "1".to_string());
        let canonical = canonical_string(&params, "secret");
        assert_eq!(canonical, "a1b2secret");
        assert_eq!(
            digest(&canonical),
            "7AA963EEE05FA1722B603B8B0668DD7FA777E3EE2F12CFC447808CD2A9587529"
        );
    }

    #[test]
    fn test_key_order_is_byte_order() {
        let builder = SignatureBuilder::new("k", "s");
        let mut params = Params::new();
        params.insert("Zeta".into(), "1".into());
        params.insert("alpha".into(), "2".into());
        let signed = builder.sign_at("m", &params, 1).unwrap();
        let canonical = canonical_string(signed.params(), "s");
        // Uppercase sorts before lowercase in byte order
        assert!(canonical.find("Zeta1").unwrap() < canonical.find("alpha2").unwrap());
    }

    #[test]
    fn test_empty_and_null_values_are_excluded() {
        let builder = SignatureBuilder::new("k", "s");
        let mut params = Params::new();
        params.insert("empty".into(), "".into());
        params.insert("missing".into(), ParamValue::Null);
        params.insert("absent".into(), Option::<String>::None.into());
        params.insert("kept".into(), "yes".into());

        let signed = builder.sign_at("m", &params, 1).unwrap();
        let canonical = canonical_string(signed.params(), "s");
        assert!(!canonical.contains("empty"));
        assert!(!canonical.contains("missing"));
        assert!(!canonical.contains("absent"));
        assert!(canonical.contains("keptyes"));
        assert!(signed.query_pairs().iter().all(|(k, _)| *k != "empty"));
    }

    #[test]
    fn test_caller_method_and_sign_are_overwritten() {
        let builder = SignatureBuilder::new("real-key", "s");
        let mut params = Params::new();
        params.insert("method".into(), "spoofed".into());
        params.insert("sign".into(), "FORGED".into());
        params.insert("app_key".into(), "other".into());

        let signed = builder.sign_at("aliexpress.affiliate.link.generate", &params, 1).unwrap();
        assert_eq!(signed.params()["method"], "aliexpress.affiliate.link.generate");
        assert_eq!(signed.params()["app_key"], "real-key");
        assert!(!signed.params().contains_key("sign"));
        assert_ne!(signed.sign(), "FORGED");

        let pairs = signed.query_pairs();
        assert_eq!(pairs.iter().filter(|(k, _)| *k == "sign").count(), 1);
    }

    #[test]
    fn test_system_fields_injected() {
        let builder = SignatureBuilder::new("123", "S");
        let signed = builder.sign_at(CATEGORY_GET, &Params::new(), 42).unwrap();
        let params = signed.params();
        assert_eq!(params["timestamp"], "42");
        assert_eq!(params["format"], RESPONSE_FORMAT);
        assert_eq!(params["v"], API_VERSION);
        assert_eq!(params["sign_method"], SIGN_METHOD);
        assert_eq!(signed.method(), CATEGORY_GET);
    }

    #[test]
    fn test_numbers_render_without_separators() {
        let builder = SignatureBuilder::new("k", "s");
        let mut params = Params::new();
        params.insert("big".into(), 1_234_567i64.into());
        params.insert("price".into(), 1999.5f64.into());

        let signed = builder.sign_at("m", &params, 1).unwrap();
        assert_eq!(signed.params()["big"], "1234567");
        assert_eq!(signed.params()["price"], "1999.5");
    }

    #[test]
    fn test_rejects_invalid_input() {
        let builder = SignatureBuilder::new("k", "s");
        assert_eq!(
            builder.sign_at("  ", &Params::new(), 1),
            Err(SignatureError::EmptyMethod)
        );

        let mut params = Params::new();
        params.insert("".into(), "x".into());
        assert_eq!(builder.sign_at("m", &params, 1), Err(SignatureError::EmptyKey));

        let mut params = Params::new();
        params.insert("ratio".into(), f64::NAN.into());
        assert!(matches!(
            builder.sign_at("m", &params, 1),
            Err(SignatureError::NonFiniteNumber { .. })
        ));
    }

    #[test]
    fn test_params_from_json() {
        let object = json!({"keywords": "lamp", "page_no": 1, "max": 9.5, "skip": null});
        let params = params_from_json(object.as_object().unwrap()).unwrap();
        assert_eq!(params["keywords"], ParamValue::Text("lamp".into()));
        assert_eq!(params["page_no"], ParamValue::Integer(1));
        assert_eq!(params["max"], ParamValue::Decimal(9.5));
        assert_eq!(params["skip"], ParamValue::Null);

        let object = json!({"flag": true});
        assert_eq!(
            params_from_json(object.as_object().unwrap()),
            Err(SignatureError::UnsupportedValue {
                key: "flag".into(),
                kind: "boolean"
            })
        );
    }
}
