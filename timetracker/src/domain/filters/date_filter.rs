use chrono::NaiveDate;

use super::PortalFilter;
use crate::{dates, FormFields};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFilter {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateFilter {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }
}

impl PortalFilter for DateFilter {
    fn form_fields(&self, fields: &FormFields) -> Vec<(String, String)> {
        vec![
            (fields.date.clone(), dates::format_form_date(self.from)),
            (fields.date_to.clone(), dates::format_form_date(self.to)),
        ]
    }
}
