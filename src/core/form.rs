//! Reads a tab's form fields into a typed [`Rate`].
//!
//! Values are trimmed and empty strings count as absent, which is how an
//! untouched `<input>` or an unselected `<select>` reads back.

use crate::core::FormSource;
use crate::domain::model::{Rate, RateDetails, RateType, DEFAULT_CURRENCY};
use crate::utils::error::{RateError, Result};
use chrono::NaiveDate;

/// Field names that each form exposes, common fields last.
pub fn form_fields(rate_type: RateType) -> &'static [&'static str] {
    match rate_type {
        RateType::Sea => &[
            "origin_port",
            "destination_port",
            "container_type",
            "incoterm",
            "price",
            "currency",
            "transit_days",
            "valid_until",
            "notes",
        ],
        RateType::PreCarriage => &[
            "origin_city",
            "destination_port",
            "country",
            "container_type",
            "price",
            "currency",
            "transit_days",
            "valid_until",
            "notes",
        ],
        RateType::OnCarriage => &[
            "origin_port",
            "destination_city",
            "country",
            "container_type",
            "price",
            "currency",
            "transit_days",
            "valid_until",
            "notes",
        ],
        RateType::Terminal => &[
            "port",
            "container_type",
            "included_services",
            "price",
            "currency",
            "transit_days",
            "valid_until",
            "notes",
        ],
        RateType::Customs => &[
            "country",
            "port",
            "included_services",
            "price",
            "currency",
            "transit_days",
            "valid_until",
            "notes",
        ],
    }
}

struct Reader<'a, F: FormSource + ?Sized> {
    form: &'a F,
}

impl<'a, F: FormSource + ?Sized> Reader<'a, F> {
    fn optional(&self, name: &str) -> Option<String> {
        self.form
            .field(name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn required(&self, name: &str, label: &str) -> Result<String> {
        self.optional(name)
            .ok_or_else(|| RateError::validation(name, format!("{} is required", label)))
    }

    fn port(&self, name: &str, label: &str) -> Result<String> {
        self.required(name, label).map(|p| p.to_ascii_uppercase())
    }

    fn optional_port(&self, name: &str) -> Option<String> {
        self.optional(name).map(|p| p.to_ascii_uppercase())
    }

    fn list(&self, name: &str) -> Vec<String> {
        self.optional(name)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn price(&self) -> Result<f64> {
        let Some(raw) = self.optional("price") else {
            return Ok(0.0);
        };
        // only `1,200.50` grouping; a comma after the decimal point is ambiguous
        if raw.find('.').is_some_and(|dot| raw[dot..].contains(',')) {
            return Err(RateError::validation(
                "price",
                format!("Price '{}' must use '.' for decimals and ',' for thousands", raw),
            ));
        }
        let price: f64 = raw
            .replace(',', "")
            .parse()
            .map_err(|_| RateError::validation("price", format!("Price '{}' is not a number", raw)))?;
        if !price.is_finite() || price < 0.0 {
            return Err(RateError::validation(
                "price",
                "Price must be zero or greater",
            ));
        }
        Ok(price)
    }

    fn transit_days(&self) -> Result<Option<u32>> {
        self.optional("transit_days")
            .map(|raw| {
                raw.parse::<u32>().map_err(|_| {
                    RateError::validation(
                        "transit_days",
                        format!("Transit days '{}' must be a whole number", raw),
                    )
                })
            })
            .transpose()
    }

    fn valid_until(&self) -> Result<Option<NaiveDate>> {
        self.optional("valid_until")
            .map(|raw| {
                NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
                    RateError::validation(
                        "valid_until",
                        format!("Valid until '{}' must be a date (YYYY-MM-DD)", raw),
                    )
                })
            })
            .transpose()
    }
}

/// Builds the rate for `rate_type` from its form, or the first validation error.
pub fn collect<F: FormSource + ?Sized>(rate_type: RateType, form: &F) -> Result<Rate> {
    let r = Reader { form };

    let details = match rate_type {
        RateType::Sea => RateDetails::Sea {
            origin_port: r.port("origin_port", "Origin port")?,
            destination_port: r.port("destination_port", "Destination port")?,
            container_type: r.optional("container_type"),
            incoterm: r.optional("incoterm").map(|i| i.to_ascii_uppercase()),
        },
        RateType::PreCarriage => RateDetails::PreCarriage {
            origin_city: r.required("origin_city", "Origin city")?,
            destination_port: r.port("destination_port", "Destination port")?,
            country: r.optional("country"),
            container_type: r.optional("container_type"),
        },
        RateType::OnCarriage => RateDetails::OnCarriage {
            origin_port: r.port("origin_port", "Origin port")?,
            destination_city: r.required("destination_city", "Destination city")?,
            country: r.optional("country"),
            container_type: r.optional("container_type"),
        },
        RateType::Terminal => RateDetails::Terminal {
            port: r.port("port", "Port")?,
            container_type: r.optional("container_type"),
            included_services: r.list("included_services"),
        },
        RateType::Customs => RateDetails::Customs {
            country: r.required("country", "Country")?,
            port: r.optional_port("port"),
            included_services: r.list("included_services"),
        },
    };

    Ok(Rate {
        details,
        price: r.price()?,
        currency: r
            .optional("currency")
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        transit_days: r.transit_days()?,
        valid_until: r.valid_until()?,
        notes: r.optional("notes"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_collect_sea_rate() {
        let rate = collect(
            RateType::Sea,
            &form(&[
                ("origin_port", " trpot "),
                ("destination_port", "USNYC"),
                ("container_type", "40HC"),
                ("incoterm", "fob"),
                ("price", "1,200"),
                ("transit_days", "18"),
                ("valid_until", "2026-12-31"),
            ]),
        )
        .unwrap();

        assert_eq!(
            rate.details,
            RateDetails::Sea {
                origin_port: "TRPOT".to_string(),
                destination_port: "USNYC".to_string(),
                container_type: Some("40HC".to_string()),
                incoterm: Some("FOB".to_string()),
            }
        );
        assert_eq!(rate.price, 1200.0);
        assert_eq!(rate.currency, "USD");
        assert_eq!(rate.transit_days, Some(18));
        assert_eq!(rate.valid_until, NaiveDate::from_ymd_opt(2026, 12, 31));
        assert_eq!(rate.notes, None);
    }

    #[test]
    fn test_missing_origin_port_is_a_validation_error() {
        let err = collect(RateType::Sea, &form(&[("destination_port", "USNYC")])).unwrap_err();
        match err {
            RateError::ValidationError { field, message } => {
                assert_eq!(field, "origin_port");
                assert_eq!(message, "Origin port is required");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_whitespace_only_counts_as_missing() {
        let err = collect(RateType::Customs, &form(&[("country", "   ")])).unwrap_err();
        assert!(matches!(err, RateError::ValidationError { ref field, .. } if field == "country"));
    }

    #[test]
    fn test_price_defaults_to_zero_and_rejects_negative() {
        let rate = collect(RateType::Terminal, &form(&[("port", "trmer")])).unwrap();
        assert_eq!(rate.price, 0.0);

        let err = collect(
            RateType::Terminal,
            &form(&[("port", "TRMER"), ("price", "-5")]),
        )
        .unwrap_err();
        assert!(matches!(err, RateError::ValidationError { ref field, .. } if field == "price"));

        let err = collect(
            RateType::Terminal,
            &form(&[("port", "TRMER"), ("price", "abc")]),
        )
        .unwrap_err();
        assert!(matches!(err, RateError::ValidationError { ref field, .. } if field == "price"));
    }

    #[test]
    fn test_price_grouping() {
        let rate = collect(
            RateType::Terminal,
            &form(&[("port", "TRMER"), ("price", "1,200.50")]),
        )
        .unwrap();
        assert_eq!(rate.price, 1200.5);

        let err = collect(
            RateType::Terminal,
            &form(&[("port", "TRMER"), ("price", "1.200,50")]),
        )
        .unwrap_err();
        assert!(matches!(err, RateError::ValidationError { ref field, .. } if field == "price"));
    }

    #[test]
    fn test_bad_transit_days_and_date() {
        let err = collect(
            RateType::Customs,
            &form(&[("country", "TR"), ("transit_days", "two")]),
        )
        .unwrap_err();
        assert!(matches!(err, RateError::ValidationError { ref field, .. } if field == "transit_days"));

        let err = collect(
            RateType::Customs,
            &form(&[("country", "TR"), ("valid_until", "31/12/2026")]),
        )
        .unwrap_err();
        assert!(matches!(err, RateError::ValidationError { ref field, .. } if field == "valid_until"));
    }

    #[test]
    fn test_included_services_split_on_commas() {
        let rate = collect(
            RateType::Terminal,
            &form(&[
                ("port", "TRMER"),
                ("included_services", "THC, storage,, weighing "),
                ("currency", "eur"),
            ]),
        )
        .unwrap();

        assert_eq!(rate.currency, "EUR");
        match rate.details {
            RateDetails::Terminal {
                included_services, ..
            } => assert_eq!(included_services, vec!["THC", "storage", "weighing"]),
            other => panic!("unexpected details: {:?}", other),
        }
    }

    #[test]
    fn test_every_form_lists_its_required_fields() {
        assert!(form_fields(RateType::Sea).contains(&"origin_port"));
        assert!(form_fields(RateType::PreCarriage).contains(&"origin_city"));
        assert!(form_fields(RateType::OnCarriage).contains(&"destination_city"));
        assert!(form_fields(RateType::Terminal).contains(&"port"));
        assert!(form_fields(RateType::Customs).contains(&"country"));
    }
}
