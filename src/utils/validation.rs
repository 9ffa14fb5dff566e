use std::{borrow::Cow, str::FromStr};

use bigdecimal::BigDecimal;
use itertools::Itertools;
use regex::Regex;
use serde_json::{json, Value};
use validator::{ValidationError, ValidationErrors};

use crate::error::Error;

/// Flattens field errors into `{ field, message, code }` entries, sorted by
/// field name so clients get a stable order.
pub fn into_errors(errors: &ValidationErrors) -> Vec<Value> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| (field.to_string(), errors))
        .sorted_by(|(a, _), (b, _)| a.cmp(b))
        .flat_map(|(field, errors)| {
            errors
                .iter()
                .map(|error| {
                    let message = error
                        .message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field));

                    json!({
                        "field": field,
                        "message": message,
                        "code": error.code,
                    })
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

pub fn validate_time_of_day(value: &str) -> Result<(), ValidationError> {
    let regex = Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("Invalid time regex");
    match regex.is_match(value) {
        true => Ok(()),
        false => Err(ValidationError::new("INVALID_TIME")
            .with_message(Cow::from("Time must be in 24-hour HH:MM format"))),
    }
}

/// Parses a decimal sent as text, e.g. a multipart price field.
pub fn parse_decimal(field: &str, raw: &str) -> Result<BigDecimal, Error> {
    BigDecimal::from_str(raw.trim())
        .map_err(|_| Error::InvalidArgument(format!("{} must be a decimal number", field)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Payload {
        #[validate(length(min = 3, code = "NAME_TOO_SHORT", message = "Name is too short"))]
        name: String,
        #[validate(email)]
        email: String,
    }

    #[test]
    fn reports_every_field() {
        let errors = Payload {
            name: String::from("ab"),
            email: String::from("nope"),
        }
        .validate()
        .unwrap_err();

        let errors = into_errors(&errors);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0]["field"], "email");
        assert_eq!(errors[1]["field"], "name");
        assert_eq!(errors[1]["code"], "NAME_TOO_SHORT");
        assert_eq!(errors[1]["message"], "Name is too short");
    }

    #[test]
    fn accepts_only_hh_mm() {
        assert!(validate_time_of_day("09:30").is_ok());
        assert!(validate_time_of_day("23:59").is_ok());
        assert!(validate_time_of_day("24:00").is_err());
        assert!(validate_time_of_day("9:30").is_err());
        assert!(validate_time_of_day("09:60").is_err());
    }

    #[test]
    fn parses_text_decimals() {
        assert_eq!(
            parse_decimal("price", " 12.50 ").unwrap(),
            BigDecimal::from_str("12.5").unwrap()
        );
        assert!(matches!(
            parse_decimal("price", "twelve"),
            Err(Error::InvalidArgument(message)) if message == "price must be a decimal number"
        ));
    }
}
