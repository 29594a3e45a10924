mod date_filter;

pub use date_filter::DateFilter;

use crate::FormFields;

/// A filter the portal applies through fields of its list page form.
pub trait PortalFilter {
    fn form_fields(&self, fields: &FormFields) -> Vec<(String, String)>;
}
