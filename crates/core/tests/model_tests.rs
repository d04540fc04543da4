use chrono::NaiveDate;
use portfolio_hindsight_core::errors::CoreError;
use portfolio_hindsight_core::models::crisis::{default_catalogue, CrisisEvent};
use portfolio_hindsight_core::models::month::YearMonth;
use portfolio_hindsight_core::models::position::{normalize_ticker, Currency, PositionInput};
use portfolio_hindsight_core::models::price::{DailyPriceRecord, PriceCache};
use portfolio_hindsight_core::models::request::{validate_threshold, AnalysisRequest, MarketSnapshot};
use portfolio_hindsight_core::models::settings::Settings;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn ym(s: &str) -> YearMonth {
    YearMonth::parse(s).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
//  YearMonth
// ═══════════════════════════════════════════════════════════════════

mod year_month {
    use super::*;

    #[test]
    fn from_date_takes_year_and_month() {
        assert_eq!(YearMonth::from_date(d(2008, 9, 15)).as_str(), "2008-09");
    }

    #[test]
    fn new_zero_pads() {
        assert_eq!(YearMonth::new(999, 1).unwrap().as_str(), "0999-01");
    }

    #[test]
    fn new_rejects_bad_month() {
        assert!(YearMonth::new(2020, 0).is_err());
        assert!(YearMonth::new(2020, 13).is_err());
    }

    #[test]
    fn parse_valid() {
        let m = ym("2020-03");
        assert_eq!(m.year(), 2020);
        assert_eq!(m.month(), 3);
    }

    #[test]
    fn parse_rejects_malformed() {
        for bad in ["2020-3", "20-03", "2020/03", "2020-13", "abcd-ef", "", "2020-03-01"] {
            assert!(
                matches!(YearMonth::parse(bad), Err(CoreError::ValidationError(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn lexical_order_is_chronological() {
        let mut months = vec![ym("2010-01"), ym("2009-12"), ym("2009-02"), ym("2010-10")];
        months.sort();
        let as_str: Vec<&str> = months.iter().map(YearMonth::as_str).collect();
        assert_eq!(as_str, vec!["2009-02", "2009-12", "2010-01", "2010-10"]);
    }

    #[test]
    fn string_order_matches_month_order() {
        let a = ym("2019-11");
        let b = ym("2020-02");
        assert_eq!(a.as_str() < b.as_str(), a < b);
        assert!(a.months_until(&b) > 0);
    }

    #[test]
    fn months_until_same_year() {
        assert_eq!(ym("2020-02").months_until(&ym("2020-05")), 3);
    }

    #[test]
    fn months_until_across_years() {
        assert_eq!(ym("2007-10").months_until(&ym("2013-03")), 65);
    }

    #[test]
    fn months_until_same_month_is_zero() {
        assert_eq!(ym("2020-02").months_until(&ym("2020-02")), 0);
    }

    #[test]
    fn months_until_backwards_is_negative() {
        assert_eq!(ym("2020-02").months_until(&ym("2019-12")), -2);
    }

    #[test]
    fn serde_as_plain_string() {
        let json = serde_json::to_string(&ym("2021-07")).unwrap();
        assert_eq!(json, "\"2021-07\"");
        let back: YearMonth = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ym("2021-07"));
    }

    #[test]
    fn serde_rejects_invalid_string() {
        assert!(serde_json::from_str::<YearMonth>("\"2021-7\"").is_err());
    }

    #[test]
    fn display() {
        assert_eq!(ym("2001-09").to_string(), "2001-09");
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Currency & Position
// ═══════════════════════════════════════════════════════════════════

mod position {
    use super::*;

    #[test]
    fn currency_display() {
        assert_eq!(Currency::USD.to_string(), "USD");
        assert_eq!(Currency::EUR.to_string(), "EUR");
    }

    #[test]
    fn currency_defaults_to_usd() {
        assert_eq!(Currency::default(), Currency::USD);
    }

    #[test]
    fn validate_complete_input() {
        let input = PositionInput::new(1, "  aapl ", 1000.0, Currency::EUR, d(2020, 1, 1));
        let pos = input.validate().unwrap();
        assert_eq!(pos.id, 1);
        assert_eq!(pos.ticker, "aapl");
        assert_eq!(pos.amount, 1000.0);
        assert_eq!(pos.currency, Currency::EUR);
        assert_eq!(pos.purchase_date, d(2020, 1, 1));
    }

    #[test]
    fn missing_ticker() {
        let mut input = PositionInput::new(1, "AAPL", 1000.0, Currency::USD, d(2020, 1, 1));
        input.ticker = None;
        assert!(matches!(input.validate(), Err(CoreError::MissingField(f)) if f.contains("ticker")));
    }

    #[test]
    fn blank_ticker_is_missing() {
        let input = PositionInput::new(1, "   ", 1000.0, Currency::USD, d(2020, 1, 1));
        assert!(matches!(input.validate(), Err(CoreError::MissingField(_))));
    }

    #[test]
    fn missing_amount() {
        let mut input = PositionInput::new(2, "AAPL", 1000.0, Currency::USD, d(2020, 1, 1));
        input.amount = None;
        assert!(matches!(input.validate(), Err(CoreError::MissingField(f)) if f.contains("amount")));
    }

    #[test]
    fn missing_date() {
        let mut input = PositionInput::new(3, "AAPL", 1000.0, Currency::USD, d(2020, 1, 1));
        input.purchase_date = None;
        assert!(matches!(input.validate(), Err(CoreError::MissingField(f)) if f.contains("date")));
    }

    #[test]
    fn non_positive_amount_rejected() {
        for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let input = PositionInput::new(1, "AAPL", amount, Currency::USD, d(2020, 1, 1));
            assert!(matches!(input.validate(), Err(CoreError::ValidationError(_))));
        }
    }

    #[test]
    fn default_input_is_incomplete() {
        assert!(PositionInput::default().validate().is_err());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Ticker normalisation
// ═══════════════════════════════════════════════════════════════════

mod ticker {
    use super::*;

    #[test]
    fn appends_suffix_to_bare_ticker() {
        assert_eq!(normalize_ticker("aapl", Some("US")), "AAPL.US");
    }

    #[test]
    fn trims_and_uppercases() {
        assert_eq!(normalize_ticker("  msft \t", Some("us")), "MSFT.US");
    }

    #[test]
    fn keeps_existing_suffix() {
        assert_eq!(normalize_ticker("sap.xetra", Some("US")), "SAP.XETRA");
    }

    #[test]
    fn no_suffix_configured() {
        assert_eq!(normalize_ticker("aapl", None), "AAPL");
    }

    #[test]
    fn blank_suffix_ignored() {
        assert_eq!(normalize_ticker("aapl", Some(" ")), "AAPL");
    }

    #[test]
    fn leading_dot_in_suffix_tolerated() {
        assert_eq!(normalize_ticker("aapl", Some(".US")), "AAPL.US");
    }
}

// ═══════════════════════════════════════════════════════════════════
//  PriceCache
// ═══════════════════════════════════════════════════════════════════

mod price_cache {
    use super::*;

    #[test]
    fn empty_cache() {
        let cache = PriceCache::new();
        assert_eq!(cache.symbol_count(), 0);
        assert_eq!(cache.total_entries(), 0);
        assert!(cache.get_history("AAPL.US", d(2024, 1, 1)).is_none());
    }

    #[test]
    fn set_and_get_same_day() {
        let mut cache = PriceCache::new();
        let today = d(2024, 5, 1);
        cache.set_history("aapl.us", vec![DailyPriceRecord::from_close(d(2024, 4, 30), 10.0)], today);
        let history = cache.get_history("AAPL.US", today).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(cache.symbol_count(), 1);
    }

    #[test]
    fn stale_on_another_day() {
        let mut cache = PriceCache::new();
        cache.set_history("AAPL.US", vec![DailyPriceRecord::from_close(d(2024, 4, 30), 10.0)], d(2024, 5, 1));
        assert!(cache.get_history("AAPL.US", d(2024, 5, 2)).is_none());
    }

    #[test]
    fn sorts_and_deduplicates_days() {
        let mut cache = PriceCache::new();
        let today = d(2024, 5, 1);
        cache.set_history(
            "X",
            vec![
                DailyPriceRecord::from_close(d(2024, 3, 2), 3.0),
                DailyPriceRecord::from_close(d(2024, 3, 1), 1.0),
                DailyPriceRecord::from_close(d(2024, 3, 2), 4.0),
            ],
            today,
        );
        let history = cache.get_history("X", today).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].date, d(2024, 3, 1));
        assert_eq!(history[1].close, 4.0);
    }

    #[test]
    fn clear() {
        let mut cache = PriceCache::new();
        cache.set_history("X", vec![DailyPriceRecord::from_close(d(2024, 3, 1), 1.0)], d(2024, 5, 1));
        cache.clear();
        assert_eq!(cache.total_entries(), 0);
    }

    #[test]
    fn from_close_fills_ohlc() {
        let r = DailyPriceRecord::from_close(d(2024, 3, 1), 7.5);
        assert_eq!((r.open, r.high, r.low, r.close), (7.5, 7.5, 7.5, 7.5));
        assert_eq!(r.volume, None);
    }

    #[test]
    fn record_volume_optional_in_json() {
        let json = r#"{"date":"2024-03-01","open":1.0,"high":2.0,"low":0.5,"close":1.5}"#;
        let r: DailyPriceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(r.volume, None);
        assert_eq!(r.close, 1.5);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Crisis catalogue
// ═══════════════════════════════════════════════════════════════════

mod crisis {
    use super::*;

    #[test]
    fn catalogue_is_complete_and_ordered() {
        let catalogue = default_catalogue();
        assert_eq!(catalogue.len(), 9);
        for pair in catalogue.windows(2) {
            assert!(pair[0].start_month <= pair[1].start_month);
        }
    }

    #[test]
    fn windows_are_well_formed() {
        for event in default_catalogue() {
            assert!(event.start_month <= event.end_month, "{}", event.id);
            assert!(!event.name.is_empty());
        }
    }

    #[test]
    fn ids_unique() {
        let catalogue = default_catalogue();
        let mut ids: Vec<&str> = catalogue.iter().map(|e| e.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), catalogue.len());
    }

    #[test]
    fn contains_is_inclusive() {
        let event = CrisisEvent::new("x", "X", ym("2020-02"), ym("2020-03"));
        assert!(event.contains(&ym("2020-02")));
        assert!(event.contains(&ym("2020-03")));
        assert!(!event.contains(&ym("2020-01")));
        assert!(!event.contains(&ym("2020-04")));
    }

    #[test]
    fn covid_window() {
        let covid = default_catalogue().into_iter().find(|e| e.id == "covid").unwrap();
        assert_eq!(covid.start_month, ym("2020-02"));
        assert_eq!(covid.end_month, ym("2020-03"));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  AnalysisRequest & MarketSnapshot
// ═══════════════════════════════════════════════════════════════════

mod request {
    use super::*;

    fn input(id: u64, ticker: &str) -> PositionInput {
        PositionInput::new(id, ticker, 100.0, Currency::USD, d(2020, 1, 1))
    }

    #[test]
    fn build_resolves_symbols() {
        let req = AnalysisRequest::build(&[input(1, "aapl"), input(2, "SAP.XETRA")], Some("US"), 10.0).unwrap();
        let symbols: Vec<&str> = req.positions().iter().map(|p| p.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL.US", "SAP.XETRA"]);
        assert_eq!(req.drop_threshold_pct(), 10.0);
        assert_eq!(req.crises().len(), default_catalogue().len());
    }

    #[test]
    fn symbols_are_distinct_in_order() {
        let req = AnalysisRequest::build(&[input(1, "msft"), input(2, "aapl"), input(3, "MSFT")], Some("US"), 10.0)
            .unwrap();
        assert_eq!(req.symbols(), vec!["MSFT.US".to_string(), "AAPL.US".to_string()]);
    }

    #[test]
    fn empty_positions_rejected() {
        assert!(matches!(
            AnalysisRequest::build(&[], None, 10.0),
            Err(CoreError::ValidationError(_))
        ));
    }

    #[test]
    fn duplicate_ids_rejected() {
        assert!(matches!(
            AnalysisRequest::build(&[input(1, "A"), input(1, "B")], None, 10.0),
            Err(CoreError::ValidationError(m)) if m.contains("Duplicate")
        ));
    }

    #[test]
    fn missing_field_aborts_whole_request() {
        let mut broken = input(2, "B");
        broken.amount = None;
        assert!(matches!(
            AnalysisRequest::build(&[input(1, "A"), broken], None, 10.0),
            Err(CoreError::MissingField(_))
        ));
    }

    #[test]
    fn with_crises_replaces_catalogue() {
        let req = AnalysisRequest::build(&[input(1, "A")], None, 10.0)
            .unwrap()
            .with_crises(vec![CrisisEvent::new("x", "X", ym("2020-01"), ym("2020-02"))]);
        assert_eq!(req.crises().len(), 1);
    }

    #[test]
    fn threshold_bounds() {
        assert!(validate_threshold(1.0).is_ok());
        assert!(validate_threshold(100.0).is_ok());
        assert!(validate_threshold(0.5).is_ok());
        for bad in [0.0, -1.0, 100.1, f64::NAN] {
            assert!(validate_threshold(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn snapshot_missing_history_is_empty() {
        let snapshot = MarketSnapshot::default();
        assert!(snapshot.history("NOPE").is_empty());
    }

    #[test]
    fn snapshot_fx_rate_filters_unusable() {
        let mut snapshot = MarketSnapshot::default();
        assert_eq!(snapshot.fx_rate(), None);
        snapshot.usd_per_eur = Some(0.0);
        assert_eq!(snapshot.fx_rate(), None);
        snapshot.usd_per_eur = Some(f64::NAN);
        assert_eq!(snapshot.fx_rate(), None);
        snapshot.usd_per_eur = Some(1.08);
        assert_eq!(snapshot.fx_rate(), Some(1.08));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Settings
// ═══════════════════════════════════════════════════════════════════

mod settings {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert!(s.api_keys.is_empty());
        assert_eq!(s.exchange_code, "US");
        assert_eq!(s.drop_threshold_pct, 10.0);
    }

    #[test]
    fn serde_roundtrip() {
        let mut s = Settings::default();
        s.api_keys.insert("eodhd".into(), "demo".into());
        let json = serde_json::to_string(&s).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.api_keys.get("eodhd").map(String::as_str), Some("demo"));
    }
}
