//! Form types and submission records.

use std::collections::BTreeMap;

use chrono::{
    DateTime,
    Utc,
};

/// The eight lead-capture forms and their spreadsheet schemas.
///
/// Each variant maps to a fixed named range and a fixed positional column
/// order. The sheet has no header-matching logic, only positional append,
/// so the column order here is load-bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormType {
    /// ATM agent application.
    Agent,
    /// Influencer partnership application.
    Influencer,
    /// Franchise enquiry.
    Franchise,
    /// Contact form.
    Contact,
    /// ATM installation enquiry.
    AtmEnquiry,
    /// Location / site submission.
    Location,
    /// Job application.
    JobApplication,
    /// General enquiry.
    GeneralEnquiry,
}

impl FormType {
    /// Every form type, in sheet order.
    pub const ALL: [Self; 8] = [
        Self::Agent,
        Self::Influencer,
        Self::Franchise,
        Self::Contact,
        Self::AtmEnquiry,
        Self::Location,
        Self::JobApplication,
        Self::GeneralEnquiry,
    ];

    /// Parses the `formType` discriminator from the request body.
    #[must_use]
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "agent" => Some(Self::Agent),
            "influencer" => Some(Self::Influencer),
            "franchise" => Some(Self::Franchise),
            "contact" => Some(Self::Contact),
            "atm_enquiry" => Some(Self::AtmEnquiry),
            "location" => Some(Self::Location),
            "job_application" => Some(Self::JobApplication),
            "general_enquiry" => Some(Self::GeneralEnquiry),
            _ => None,
        }
    }

    /// Wire name, also the id prefix.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::Influencer => "influencer",
            Self::Franchise => "franchise",
            Self::Contact => "contact",
            Self::AtmEnquiry => "atm_enquiry",
            Self::Location => "location",
            Self::JobApplication => "job_application",
            Self::GeneralEnquiry => "general_enquiry",
        }
    }

    /// Sheet tab this form appends to.
    #[must_use]
    pub const fn sheet_name(self) -> &'static str {
        match self {
            Self::Agent => "Agent Leads",
            Self::Influencer => "Influencer Leads",
            Self::Franchise => "Franchise Leads",
            Self::Contact => "Contact Messages",
            Self::AtmEnquiry => "ATM Enquiries",
            Self::Location => "Location Submissions",
            Self::JobApplication => "Job Applications",
            Self::GeneralEnquiry => "General Enquiries",
        }
    }

    /// Named range for the append call.
    #[must_use]
    pub fn named_range(self) -> String {
        format!("{}!A:Z", self.sheet_name())
    }

    /// Fixed positional column schema, id and timestamp first.
    #[must_use]
    pub const fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Agent => {
                &["id", "timestamp", "name", "email", "phone", "city", "state", "occupation", "investment_capacity"]
            }
            Self::Influencer => {
                &["id", "timestamp", "name", "email", "phone", "platform", "followers", "channel_link"]
            }
            Self::Franchise => {
                &["id", "timestamp", "name", "email", "phone", "city", "state", "investment_capacity", "preferred_model"]
            }
            Self::Contact => &["id", "timestamp", "name", "email", "phone", "subject", "message"],
            Self::AtmEnquiry => {
                &["id", "timestamp", "name", "email", "phone", "city", "state", "site_ownership", "message"]
            }
            Self::Location => {
                &["id", "timestamp", "name", "email", "phone", "address", "city", "state", "pincode", "site_type"]
            }
            Self::JobApplication => {
                &["id", "timestamp", "name", "email", "phone", "position", "experience_years", "resume_link", "cover_note"]
            }
            Self::GeneralEnquiry => &["id", "timestamp", "name", "email", "phone", "message"],
        }
    }

    /// Form-specific required fields beyond name, email and phone.
    #[must_use]
    pub const fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::Agent | Self::Franchise => &["city", "state"],
            Self::Influencer => &["platform"],
            Self::Contact | Self::GeneralEnquiry | Self::AtmEnquiry => &["message"],
            Self::Location => &["address", "city", "state"],
            Self::JobApplication => &["position"],
        }
    }
}

/// One lead-capture event, at rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    /// Which form produced this submission.
    pub form_type: FormType,
    /// Generated id, `{formType}_{epochMillis}`.
    pub id: String,
    /// Submission time as epoch milliseconds.
    pub submitted_at_millis: u64,
    /// Flat key/value record from the client form state.
    pub fields: BTreeMap<String, String>,
}

impl FormSubmission {
    /// Builds a submission from client form state.
    #[must_use]
    pub fn new(form_type: FormType, fields: BTreeMap<String, String>, now_millis: u64) -> Self {
        let id = format!("{}_{now_millis}", form_type.wire_name());
        Self { form_type, id, submitted_at_millis: now_millis, fields }
    }

    /// One submitted field, trimmed; `None` when missing or blank.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = self.fields.get(name)?.trim();
        if value.is_empty() { None } else { Some(value) }
    }

    /// Submission time as an RFC 3339 string.
    #[must_use]
    pub fn timestamp(&self) -> String {
        #[allow(clippy::cast_possible_wrap)] // epoch millis stay far below i64::MAX
        DateTime::<Utc>::from_timestamp_millis(self.submitted_at_millis as i64)
            .map_or_else(String::new, |dt| dt.to_rfc3339())
    }

    /// Renders the positional spreadsheet row for this form type.
    ///
    /// Missing fields become empty cells; the column order is exactly
    /// [`FormType::columns`].
    #[must_use]
    pub fn sheet_row(&self) -> Vec<String> {
        self.form_type
            .columns()
            .iter()
            .map(|column| match *column {
                "id" => self.id.clone(),
                "timestamp" => self.timestamp(),
                name => self.field(name).unwrap_or_default().to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    /// Submission fixture with the common fields set.
    fn submission(form_type: FormType) -> FormSubmission {
        let fields = BTreeMap::from([
            ("name".to_string(), "Asha Rao".to_string()),
            ("email".to_string(), "asha@example.com".to_string()),
            ("phone".to_string(), "9876543210".to_string()),
            ("message".to_string(), "Interested in a WLA site".to_string()),
        ]);
        FormSubmission::new(form_type, fields, 1_700_000_000_000)
    }

    #[rstest]
    fn wire_names_round_trip() {
        for form_type in FormType::ALL {
            assert_that!(FormType::from_wire(form_type.wire_name()), some(eq(form_type)));
        }
        assert_that!(FormType::from_wire("unknown"), none());
    }

    #[rstest]
    fn id_is_wire_name_plus_epoch_millis() {
        let submission = submission(FormType::Contact);

        assert_that!(submission.id, eq("contact_1700000000000"));
    }

    #[rstest]
    fn timestamp_is_rfc3339() {
        let submission = submission(FormType::Contact);

        assert_that!(submission.timestamp(), eq("2023-11-14T22:13:20+00:00"));
    }

    #[rstest]
    fn named_range_covers_all_columns() {
        assert_that!(FormType::Agent.named_range(), eq("Agent Leads!A:Z"));
        assert_that!(FormType::GeneralEnquiry.named_range(), eq("General Enquiries!A:Z"));
    }

    #[rstest]
    fn sheet_row_follows_the_positional_schema() {
        let submission = submission(FormType::GeneralEnquiry);

        let row = submission.sheet_row();

        assert_that!(
            row,
            elements_are![
                eq("general_enquiry_1700000000000"),
                eq("2023-11-14T22:13:20+00:00"),
                eq("Asha Rao"),
                eq("asha@example.com"),
                eq("9876543210"),
                eq("Interested in a WLA site")
            ]
        );
    }

    #[rstest]
    fn sheet_row_renders_missing_fields_as_empty_cells() {
        let submission = submission(FormType::Contact);

        let row = submission.sheet_row();

        // "subject" was never submitted
        assert_that!(row, len(eq(FormType::Contact.columns().len())));
        assert_that!(row[5], eq(""));
    }

    #[rstest]
    fn blank_fields_read_as_missing() {
        let fields = BTreeMap::from([("name".to_string(), "   ".to_string())]);
        let submission = FormSubmission::new(FormType::Contact, fields, 1);

        assert_that!(submission.field("name"), none());
        assert_that!(submission.field("email"), none());
    }
}
