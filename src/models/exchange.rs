use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::AppError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Самая ранняя дата, за которую у поставщика есть курсы
pub fn earliest_historic_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1999, 1, 1).unwrap_or_default()
}

/// Тело запроса `POST /convert/` до проверки.
///
/// Конвертация по сегодняшнему курсу:
/// ```json
/// { "currency_from": "GBP", "currency_to": "USD", "amount": 22 }
/// ```
///
/// По курсу на дату (`YYYY-MM-DD`, история есть с 1999-01-01):
/// ```json
/// { "currency_from": "GBP", "currency_to": "USD", "amount": 22, "historic_date": "2022-01-17" }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertPayload {
    pub currency_from: String,
    pub currency_to: String,
    pub amount: f64,
    #[serde(default)]
    pub historic_date: Option<String>,
}

/// Запрос на конвертацию суммы из одной валюты в другую
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangeRequest {
    pub currency_from: String,
    pub currency_to: String,
    pub amount: f64,
    /// `None` - курс на сегодня
    pub historic_date: Option<NaiveDate>,
}

impl ExchangeRequest {
    pub fn new(from: impl Into<String>, to: impl Into<String>, amount: f64) -> Self {
        Self {
            currency_from: from.into(),
            currency_to: to.into(),
            amount,
            historic_date: None,
        }
    }
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.historic_date = Some(date);
        self
    }
}

impl TryFrom<ConvertPayload> for ExchangeRequest {
    type Error = AppError;

    fn try_from(value: ConvertPayload) -> Result<Self, Self::Error> {
        let historic_date = match value.historic_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_historic_date(raw, today())?),
        };
        Ok(Self {
            currency_from: value.currency_from,
            currency_to: value.currency_to,
            amount: value.amount,
            historic_date,
        })
    }
}

/// Разбирает дату `YYYY-MM-DD`, не раньше 1999-01-01 и не позже `today`
pub fn parse_historic_date(raw: &str, today: NaiveDate) -> Result<NaiveDate, AppError> {
    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| {
        AppError::Validation(format!("historic_date '{raw}' is not YYYY-MM-DD: {e}"))
    })?;
    let earliest = earliest_historic_date();
    if date < earliest {
        return Err(AppError::Validation(format!(
            "historic_date {date} is before {earliest}"
        )));
    }
    if date > today {
        return Err(AppError::Validation(format!(
            "historic_date {date} is in the future"
        )));
    }
    Ok(date)
}

/// Текущая дата по UTC, по ней строятся ключи кэша
pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}
