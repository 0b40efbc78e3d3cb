use std::collections::HashMap;

use serde::Deserialize;

use super::errors::FetchError;

pub const BTC_BRL: &str = "BTCBRL";
pub const BTC_USD: &str = "BTCUSD";
pub const USD_BRL: &str = "USDBRL";

/// One currency pair as returned by the quote API.
///
/// Only `bid` is required; everything else is descriptive.
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuote {
    pub bid: String,

    #[serde(default)]
    pub ask: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub codein: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub high: Option<String>,
    #[serde(default)]
    pub low: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub create_date: Option<String>,
}

impl RawQuote {
    #[cfg(test)]
    pub(crate) fn with_bid(bid: &str) -> Self {
        Self {
            bid: bid.to_string(),
            ask: None,
            code: None,
            codein: None,
            name: None,
            high: None,
            low: None,
            timestamp: None,
            create_date: None,
        }
    }
}

/// Response body: quotes keyed by pair code (`BTCBRL`, ...).
pub type QuotePayload = HashMap<String, RawQuote>;

/// The three pairs the service needs, still as unvalidated strings.
#[derive(Debug, Clone)]
pub struct QuoteSet {
    pub btc_brl: RawQuote,
    pub btc_usd: RawQuote,
    pub usd_brl: RawQuote,
}

impl QuoteSet {
    pub fn from_payload(mut payload: QuotePayload) -> Result<Self, FetchError> {
        let mut take = |pair: &'static str| {
            payload
                .remove(pair)
                .ok_or_else(|| FetchError::MalformedResponse(format!("missing pair {pair}")))
        };

        Ok(Self {
            btc_brl: take(BTC_BRL)?,
            btc_usd: take(BTC_USD)?,
            usd_brl: take(USD_BRL)?,
        })
    }

    pub fn from_json(body: &[u8]) -> Result<Self, FetchError> {
        let payload: QuotePayload = serde_json::from_slice(body)
            .map_err(|e| FetchError::MalformedResponse(e.to_string()))?;
        Self::from_payload(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "BTCBRL": {"code":"BTC","codein":"BRL","name":"Bitcoin/Real Brasileiro","high":"560000","low":"540000","bid":"550000.5","ask":"550100","timestamp":"1700000000","create_date":"2023-11-14 22:13:20"},
        "BTCUSD": {"code":"BTC","codein":"USD","bid":"95000.1"},
        "USDBRL": {"bid":"5.4812"}
    }"#;

    #[test]
    fn parses_all_three_pairs() {
        let set = QuoteSet::from_json(BODY.as_bytes()).unwrap();

        assert_eq!(set.btc_brl.bid, "550000.5");
        assert_eq!(set.btc_brl.code.as_deref(), Some("BTC"));
        assert_eq!(set.btc_usd.bid, "95000.1");
        assert_eq!(set.usd_brl.bid, "5.4812");
        assert!(set.usd_brl.ask.is_none());
    }

    #[test]
    fn missing_pair_is_malformed() {
        let body = r#"{"BTCBRL":{"bid":"1"},"BTCUSD":{"bid":"1"}}"#;

        match QuoteSet::from_json(body.as_bytes()) {
            Err(FetchError::MalformedResponse(msg)) => assert!(msg.contains(USD_BRL)),
            other => panic!("expected MalformedResponse, got {other:?}"),
        }
    }

    #[test]
    fn missing_bid_field_is_malformed() {
        let body = r#"{"BTCBRL":{"ask":"1"},"BTCUSD":{"bid":"1"},"USDBRL":{"bid":"1"}}"#;

        assert!(matches!(
            QuoteSet::from_json(body.as_bytes()),
            Err(FetchError::MalformedResponse(_))
        ));
    }

    #[test]
    fn non_json_body_is_malformed() {
        assert!(matches!(
            QuoteSet::from_json(b"<html>rate limited</html>"),
            Err(FetchError::MalformedResponse(_))
        ));
    }
}
