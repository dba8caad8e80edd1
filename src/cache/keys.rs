use chrono::NaiveDate;

/// One entry per calendar day, e.g. `currencies_2021-03-17`
pub fn supported_currencies_key(today: NaiveDate) -> String {
    format!("currencies_{}", today.format("%Y-%m-%d"))
}

/// Currency codes are used as given, `usd` and `USD` are different keys
pub fn exchange_rate_key(from: &str, to: &str, date: NaiveDate) -> String {
    format!("{from}_{to}_{}", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_supported_currencies_key() {
        assert_eq!(
            supported_currencies_key(date(2021, 3, 17)),
            "currencies_2021-03-17"
        );
    }

    #[test]
    fn test_exchange_rate_key_format() {
        assert_eq!(
            exchange_rate_key("GBP", "USD", date(2022, 1, 17)),
            "GBP_USD_2022-01-17"
        );
    }

    #[test]
    fn test_exchange_rate_key_is_scoped_by_direction_and_date() {
        let d = date(2022, 1, 17);
        let key = exchange_rate_key("GBP", "USD", d);
        assert_eq!(key, exchange_rate_key("GBP", "USD", d));
        assert_ne!(key, exchange_rate_key("USD", "GBP", d));
        assert_ne!(key, exchange_rate_key("GBP", "USD", date(2022, 1, 18)));
        assert_ne!(key, exchange_rate_key("gbp", "usd", d));
    }
}
